//! This library handles reading from and creating the **GameData** documents used by *GuJian 3*.
//!
//! GameData documents hold the game's tables (items, quests, dialogue) as a tree of tagged
//! values. A document is a 4 byte magic followed by a single root value, normally an object map.
//!
//! ## Value Tags
//!
//! Every value starts with a 1 byte tag:
//!
//! | Tag    | Value        | Payload                                                        |
//! |--------|--------------|----------------------------------------------------------------|
//! | `0x00` | Nil          | none; also terminates the entries of an object map             |
//! | `0x01` | True         | none                                                           |
//! | `0x02` | False        | none                                                           |
//! | `0x03` | Byte         | 1 byte                                                         |
//! | `0x04` | Short        | 2 bytes                                                        |
//! | `0x05` | Int          | 4 bytes                                                        |
//! | `0x06` | Long         | 8 bytes                                                        |
//! | `0x07` | Double       | 8 bytes IEEE 754                                               |
//! | `0x08` | String       | 1 byte length, UTF-8 data                                      |
//! | `0x09` | String       | 2 byte length, UTF-8 data                                      |
//! | `0x0B` | Object map   | 4 byte child count, children, key/value pairs, `0x00`          |
//! | `0x0D` | Tuple        | two values                                                     |
//! | `0x0F` | Typed ref    | 2 bytes                                                        |
//! | `0x10` | Typed ref    | 4 bytes                                                        |
//!
//! ## String Paths
//!
//! Reading a document collects every string that is not a map key into a [`StringTable`], keyed
//! by a `/` separated path. The same paths are used by translation files, which is why the way a
//! map key is rendered into a path segment (`i:42`, `True`, ...) is part of the format.
//!
//! ## Additional Information
//!
//! - **Magic**: `0xF2060881` or `0xD5B50981`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
#[cfg(feature = "serde")]
mod serialize;
pub mod types;
pub mod write;

pub use read::GameDataReader;
pub use types::{GameData, GameDataValue, ObjectMap, StringTable};
