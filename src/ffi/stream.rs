//! Host-backed input streams from the C side

use core::ffi::c_void;
use std::io::Read;

use crate::boundary;
use crate::handle::HostHandle;
use crate::stream::{self, into_bridge_error, HostInputStream, ReadFn, SeekFn, SeekableFn, TellFn};

#[no_mangle]
pub extern "C" fn wl_install_input_stream_callbacks(
    read: Option<ReadFn>,
    seekable: Option<SeekableFn>,
    tell: Option<TellFn>,
    seek: Option<SeekFn>,
) {
    stream::install_callbacks(read, seekable, tell, seek);
}

/// Stream over the host file object `file`; delete with
/// `wl_input_stream_delete`
#[no_mangle]
pub extern "C" fn wl_input_stream_new(file: *mut c_void) -> *mut c_void {
    boundary::construct("wl_input_stream_new", || {
        Ok(HostInputStream::new(HostHandle::from_raw(file)))
    })
}

/// # Safety
/// `stream` must come from `wl_input_stream_new` or `wl_input_stream_clone`.
#[no_mangle]
pub unsafe extern "C" fn wl_input_stream_clone(stream: *const c_void) -> *mut c_void {
    boundary::with_instance(
        "wl_input_stream_clone",
        stream,
        |stream: &HostInputStream| Ok(stream.clone()),
        |copy| Ok(Box::into_raw(Box::new(copy)).cast()),
    )
}

/// # Safety
/// `stream` must be null or an undeleted stream pointer.
#[no_mangle]
pub unsafe extern "C" fn wl_input_stream_delete(stream: *mut c_void) {
    boundary::destroy::<HostInputStream>("wl_input_stream_delete", stream);
}

/// Read up to `size` bytes into `buffer`; 0 at end of stream or on error
/// (check `wl_has_error`)
///
/// # Safety
/// `stream` must be a live stream pointer and `buffer` valid for `size`
/// writes.
#[no_mangle]
pub unsafe extern "C" fn wl_input_stream_read(stream: *mut c_void, buffer: *mut c_void, size: usize) -> usize {
    boundary::with_instance_mut(
        "wl_input_stream_read",
        stream,
        |stream: &mut HostInputStream| {
            if size == 0 {
                return Ok(0);
            }
            let buffer = core::slice::from_raw_parts_mut(buffer.cast::<u8>(), size);
            stream.read(buffer).map_err(into_bridge_error)
        },
        Ok,
    )
}
