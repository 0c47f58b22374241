//! Input stream backed by a host file-like object
//!
//! The host installs four callbacks once; each stream holds a counted
//! reference to its file object and forwards reads and seeks to it.

use core::ffi::{c_int, c_void};
use std::io::{self, Read, Seek, SeekFrom};

use crate::dispatch::HostFnSlot;
use crate::error::BridgeError;
use crate::exception;
use crate::handle::{HostHandle, UserData};

/// `size_t read(void* file, void* buffer, size_t size)`, bytes read
pub type ReadFn = unsafe extern "C" fn(*mut c_void, *mut c_void, usize) -> usize;
/// `int seekable(void* file)`, nonzero when seeking works
pub type SeekableFn = unsafe extern "C" fn(*mut c_void) -> c_int;
/// `int64_t tell(void* file)`, -1 on failure
pub type TellFn = unsafe extern "C" fn(*mut c_void) -> i64;
/// `int64_t seek(void* file, int64_t offset, int whence)`, new position or -1
pub type SeekFn = unsafe extern "C" fn(*mut c_void, i64, c_int) -> i64;

static READ: HostFnSlot<ReadFn> = HostFnSlot::new("input_stream.read");
static SEEKABLE: HostFnSlot<SeekableFn> = HostFnSlot::new("input_stream.seekable");
static TELL: HostFnSlot<TellFn> = HostFnSlot::new("input_stream.tell");
static SEEK: HostFnSlot<SeekFn> = HostFnSlot::new("input_stream.seek");

pub const SEEK_FROM_START: c_int = 0;
pub const SEEK_FROM_CURRENT: c_int = 1;
pub const SEEK_FROM_END: c_int = 2;

/// Install the host's stream callbacks. `None` leaves that operation
/// unsupported.
pub fn install_callbacks(
    read: Option<ReadFn>,
    seekable: Option<SeekableFn>,
    tell: Option<TellFn>,
    seek: Option<SeekFn>,
) {
    READ.set(read);
    SEEKABLE.set(seekable);
    TELL.set(tell);
    SEEK.set(seek);
}

#[derive(Debug, Clone)]
pub struct HostInputStream {
    file: UserData,
}

impl HostInputStream {
    pub fn new(file: HostHandle) -> Self {
        Self {
            file: UserData::from_handle(file),
        }
    }

    pub fn file(&self) -> HostHandle {
        self.file.handle()
    }

    pub fn is_seekable(&self) -> bool {
        match SEEKABLE.get() {
            // SAFETY: installed by the host with this signature
            Some(seekable) => unsafe { seekable(self.file.get_handle()) != 0 },
            None => false,
        }
    }

    pub fn tell(&self) -> io::Result<u64> {
        let tell = TELL.get().ok_or_else(|| unsupported(&TELL))?;
        let position = unsafe { tell(self.file.get_handle()) };
        host_result()?;
        u64::try_from(position).map_err(|_| io::Error::other("host stream cannot report its position"))
    }
}

impl Read for HostInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = READ.get().ok_or_else(|| unsupported(&READ))?;
        let count = unsafe { read(self.file.get_handle(), buf.as_mut_ptr().cast(), buf.len()) };
        host_result()?;
        // A misbehaving host must not make us claim bytes we don't have
        Ok(count.min(buf.len()))
    }
}

impl Seek for HostInputStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if !self.is_seekable() {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "host stream is not seekable"));
        }
        let seek = SEEK.get().ok_or_else(|| unsupported(&SEEK))?;
        let (offset, whence) = match pos {
            SeekFrom::Start(offset) => (
                i64::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
                SEEK_FROM_START,
            ),
            SeekFrom::Current(offset) => (offset, SEEK_FROM_CURRENT),
            SeekFrom::End(offset) => (offset, SEEK_FROM_END),
        };

        let position = unsafe { seek(self.file.get_handle(), offset, whence) };
        host_result()?;
        u64::try_from(position).map_err(|_| io::Error::other("host stream seek failed"))
    }
}

/// Map an I/O failure back onto the bridge taxonomy for the error channel
pub fn into_bridge_error(err: io::Error) -> BridgeError {
    match err.get_ref().and_then(|inner| inner.downcast_ref::<BridgeError>()) {
        Some(bridge) => bridge.clone(),
        None => BridgeError::Host {
            name: "IOError".to_string(),
            message: err.to_string(),
        },
    }
}

fn host_result() -> io::Result<()> {
    exception::check().map_err(io::Error::other)
}

fn unsupported<F: crate::dispatch::HostFn>(slot: &HostFnSlot<F>) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("host callback {} not installed", slot.name()),
    )
}
