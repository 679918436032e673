//! This library handles reading from and creating the **ZFS** archives used by *GuJian 3*.
//!
//! Archives are content addressed: every file is stored once under the SHA-1 of its contents,
//! normally packed into an Oodle frame. A separate [`NameIndex`] maps the game's file names onto
//! those hashes, and the files of one install are spread over several archives (*shards*).
//!
//! # Archive Layout
//!
//! | Offset         | Size      | Description                                            |
//! |----------------|-----------|--------------------------------------------------------|
//! | `0x00`         | 4 bytes   | Magic `ZFS\0`                                          |
//! | `0x04`         | 4 bytes   | Chunk magic `[IX]`                                     |
//! | `0x08`         | 4 bytes   | Offset of the next chunk, `0` for the last one         |
//! | `0x0C`         | `0x20000` | 4096 index entries of 32 bytes                         |
//! | `0x2000C`      | variable  | File data, followed by the next chunk if there is one  |
//!
//! Every following chunk has the same layout, starting at its chunk magic.
//!
//! ## Index Entry
//!
//! | Offset | Size     | Description                                        |
//! |--------|----------|----------------------------------------------------|
//! | `0x00` | 20 bytes | SHA-1 of the file contents                          |
//! | `0x14` | 4 bytes  | Absolute offset of the data, `0` for an unused slot |
//! | `0x18` | 4 bytes  | Size of the data                                    |
//! | `0x1C` | 2 bytes  | CRC-16/ARC of the preceding 28 bytes                |
//! | `0x1E` | 2 bytes  | Always `0x0100`                                     |
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Name index**: an Oodle frame holding `<hash>\t<name>` lines
//!

pub mod error;
pub mod names;
pub mod planner;
pub mod read;
pub mod shard;
pub mod types;
pub mod write;

pub use names::NameIndex;
pub use planner::{BuildPlanner, PlanAction, StagedFile};
pub use read::{ZfsArchive, ZfsFile, ZfsFileData};
pub use shard::{is_shard_name, load_name_index, next_shard_name, save_name_index, write_shard};
pub use types::{ContentHash, IndexEntry};
pub use write::ZfsWriter;
