//! Codec backed by the native `oo2core` library, loaded at run time.

use std::ffi::{c_void, OsStr};
use std::fmt::{self, Debug};
use std::ptr;

use libloading::Library;
use tracing::{debug, instrument};

use crate::codec::{OodleCodec, DESIRED_SEEK_POINTS};
use crate::compression::{CompressionLevel, Compressor};
use crate::error::{Error, Result};

/// Library name shipped with the game
pub const DEFAULT_LIBRARY: &str = "oo2core_6_win64.dll";

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CompressOptions {
    verbosity: u32,
    min_match_len: i32,
    seek_chunk_reset: i32,
    seek_chunk_len: i32,
    profile: i32,
    dictionary_size: i32,
    space_speed_tradeoff_bytes: i32,
    max_huffmans_per_chunk: i32,
    send_quantum_crcs: i32,
    max_local_dictionary_size: i32,
    make_long_range_matcher: i32,
    match_table_size_log2: i32,
}

type CompressFn = unsafe extern "C" fn(
    compressor: i32,
    raw: *const u8,
    raw_len: i64,
    comp: *mut u8,
    level: i32,
    options: *const CompressOptions,
    dictionary_base: *const c_void,
    lrm: *const c_void,
    scratch: *mut c_void,
    scratch_size: i64,
) -> i64;

type DecompressFn = unsafe extern "C" fn(
    comp: *const u8,
    comp_len: i64,
    raw: *mut u8,
    raw_len: i64,
    fuzz_safe: i32,
    check_crc: i32,
    verbosity: i32,
    dec_buf_base: *mut c_void,
    dec_buf_size: i64,
    callback: *const c_void,
    callback_data: *const c_void,
    decoder_memory: *mut c_void,
    decoder_memory_size: i64,
    thread_phase: i32,
) -> i64;

type DefaultOptionsFn =
    unsafe extern "C" fn(compressor: i32, level: i32) -> *const CompressOptions;

type BufferSizeFn = unsafe extern "C" fn(raw_len: i64) -> i64;

type SeekChunkLenFn = unsafe extern "C" fn(raw_len: i64, desired_seek_points: i32) -> i32;

const FUZZ_SAFE_YES: i32 = 1;
const CHECK_CRC_NO: i32 = 0;
const VERBOSITY_NONE: i32 = 0;
const THREAD_PHASE_UNTHREADED: i32 = 3;

/// Oodle codec calling into `oo2core`
pub struct NativeOodle {
    compress: CompressFn,
    decompress: DecompressFn,
    default_options: DefaultOptionsFn,
    compressed_buffer_size: BufferSizeFn,
    seek_chunk_len: SeekChunkLenFn,
    // Keeps the function pointers above valid
    _library: Library,
}

impl Debug for NativeOodle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeOodle")
    }
}

fn load_error(e: libloading::Error) -> Error {
    Error::Codec(e.to_string())
}

impl NativeOodle {
    /// Load the library from `path`
    #[instrument(skip_all, err)]
    pub fn load(path: impl AsRef<OsStr>) -> Result<Self> {
        // SAFETY: loading runs the library's initialisers, oo2core has no special requirements
        let library = unsafe { Library::new(path.as_ref()) }.map_err(load_error)?;

        // SAFETY: the signatures match the oo2core exports they are resolved from
        unsafe {
            let compress = *library
                .get::<CompressFn>(b"OodleLZ_Compress\0")
                .map_err(load_error)?;
            let decompress = *library
                .get::<DecompressFn>(b"OodleLZ_Decompress\0")
                .map_err(load_error)?;
            let default_options = *library
                .get::<DefaultOptionsFn>(b"OodleLZ_CompressOptions_GetDefault\0")
                .map_err(load_error)?;
            let compressed_buffer_size = *library
                .get::<BufferSizeFn>(b"OodleLZ_GetCompressedBufferSizeNeeded\0")
                .map_err(load_error)?;
            let seek_chunk_len = *library
                .get::<SeekChunkLenFn>(b"OodleLZ_MakeSeekChunkLen\0")
                .map_err(load_error)?;

            debug!("loaded oodle library");

            Ok(NativeOodle {
                compress,
                decompress,
                default_options,
                compressed_buffer_size,
                seek_chunk_len,
                _library: library,
            })
        }
    }
}

impl OodleCodec for NativeOodle {
    #[instrument(skip(self, data), fields(raw = data.len()), err)]
    fn compress(
        &self,
        data: &[u8],
        compressor: Compressor,
        level: CompressionLevel,
        seek_chunk_len: i32,
    ) -> Result<Vec<u8>> {
        // SAFETY: the default options pointer is owned by the library and only read here
        let defaults = unsafe { (self.default_options)(compressor as i32, level as i32) };
        if defaults.is_null() {
            return Err(Error::Codec("no default options for compressor".into()));
        }

        let mut options = unsafe { *defaults };
        options.seek_chunk_reset = 1;
        options.seek_chunk_len = seek_chunk_len;

        let raw_len = data.len() as i64;
        let capacity = unsafe { (self.compressed_buffer_size)(raw_len) };
        let mut output = vec![0u8; capacity.max(0) as usize];

        // SAFETY: `output` holds the size the library asked for and outlives the call
        let written = unsafe {
            (self.compress)(
                compressor as i32,
                data.as_ptr(),
                raw_len,
                output.as_mut_ptr(),
                level as i32,
                &options,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
                0,
            )
        };

        if written <= 0 {
            return Err(Error::Codec(format!("OodleLZ_Compress returned {written}")));
        }

        output.truncate(written as usize);
        Ok(output)
    }

    #[instrument(skip(self, data), fields(compressed = data.len()), err)]
    fn decompress(&self, data: &[u8], decompressed_len: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; decompressed_len];

        // SAFETY: both buffers are valid for the lengths passed
        let written = unsafe {
            (self.decompress)(
                data.as_ptr(),
                data.len() as i64,
                output.as_mut_ptr(),
                decompressed_len as i64,
                FUZZ_SAFE_YES,
                CHECK_CRC_NO,
                VERBOSITY_NONE,
                ptr::null_mut(),
                0,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
                0,
                THREAD_PHASE_UNTHREADED,
            )
        };

        if written < 0 {
            return Err(Error::Codec(format!("OodleLZ_Decompress returned {written}")));
        }

        output.truncate(written as usize);
        Ok(output)
    }

    fn seek_chunk_len(&self, raw_size: i64) -> i32 {
        // SAFETY: plain arithmetic in the library
        unsafe { (self.seek_chunk_len)(raw_size, DESIRED_SEEK_POINTS) }
    }
}
