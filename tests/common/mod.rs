// Shared fixtures for integration tests
//
// The items below are written the way generated bindings use the library:
// a native class, its dispatch table, and flat entry points, plus a
// refcount hook standing in for the host.

#![allow(dead_code, non_snake_case)]

use std::cell::Cell;
use std::ffi::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use wrapper_lib::boundary;
use wrapper_lib::dispatch::{DestructorFn, DispatchTable, MethodIndex, Overridable};
use wrapper_lib::ffi::wl_set_error;
use wrapper_lib::handle::install_adjust_refcount;
use wrapper_lib::{HandleTable, HostHandle, UserData, WrappedType};

// ============================================================================
// Host side
// ============================================================================

/// Reference counts the "host" holds for its objects
pub static HOST_COUNTS: Lazy<HandleTable> = Lazy::new(HandleTable::new);

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(0x10_000);

unsafe extern "C" fn host_adjust_refcount(handle: *mut c_void, delta: c_int) {
    HOST_COUNTS.adjust(handle, delta);
}

pub fn install_host() {
    install_adjust_refcount(host_adjust_refcount);
}

/// A host object nobody else in this test binary uses
pub fn host_object() -> HostHandle {
    HostHandle::from_raw(NEXT_HANDLE.fetch_add(0x10, Ordering::Relaxed) as *mut c_void)
}

pub fn host_count(handle: HostHandle) -> i64 {
    HOST_COUNTS.count(handle.as_raw())
}

pub fn c_str(text: &str) -> *mut c_char {
    wrapper_lib::convert::c_string_from_str(text).unwrap()
}

// ============================================================================
// Negator: one virtual method, `negate(i) -> -i`
// ============================================================================

pub struct NegatorBase {
    pub base_calls: Cell<u32>,
}

impl NegatorBase {
    pub fn new() -> Self {
        Self {
            base_calls: Cell::new(0),
        }
    }

    /// `Negator::negate` as written in the native class
    pub fn negate_base(&self, i: i32) -> i32 {
        self.base_calls.set(self.base_calls.get() + 1);
        -i
    }
}

impl WrappedType for NegatorBase {
    const CLASS_NAME: &'static str = "Negator";
}

pub type Negator = Overridable<NegatorBase>;

pub const METHIDX_NEGATOR_NEGATE: MethodIndex = MethodIndex::new(1);

pub type NegateFn = unsafe extern "C" fn(*mut c_void, i32) -> i32;

pub static NEGATOR_VTABLE: Lazy<DispatchTable> = Lazy::new(|| negator_table(None));

/// A Negator table as the host fills it when subclassing, optionally with
/// an override in the `negate` slot
pub fn negator_table(negate: Option<NegateFn>) -> DispatchTable {
    let table = DispatchTable::new("Negator", 2);
    table
        .set_slot(MethodIndex::DESTRUCTOR, negator_destroyed as DestructorFn)
        .unwrap();
    if let Some(negate) = negate {
        table.set_slot(METHIDX_NEGATOR_NEGATE, negate).unwrap();
    }
    table
}

/// Addresses the destructor slot was called with
pub static DESTROYED: Lazy<Mutex<Vec<usize>>> = Lazy::new(|| Mutex::new(Vec::new()));

unsafe extern "C" fn negator_destroyed(this: *mut c_void) {
    DESTROYED.lock().push(this as usize);
}

/// Native override: host first, base otherwise
pub fn negate(this: &Negator, i: i32) -> i32 {
    wrapper_lib::dispatch_virtual!(*this, METHIDX_NEGATOR_NEGATE, fn(i: i32) -> i32, |base: &NegatorBase| {
        base.negate_base(i)
    })
}

pub extern "C" fn Negator_88_op_new() -> *mut c_void {
    boundary::construct("Negator_88_op_new", || {
        Ok(Negator::new(NegatorBase::new(), &NEGATOR_VTABLE))
    })
}

/// Instance of a host subclass using `table`, with `negate` overridden
pub fn new_overriding_negator(table: &'static DispatchTable) -> *mut c_void {
    boundary::construct("Negator_88_op_new", || {
        let obj = Negator::new(NegatorBase::new(), table);
        obj.set_flag(METHIDX_NEGATOR_NEGATE, true)?;
        Ok(obj)
    })
}

pub unsafe extern "C" fn Negator_88_op_delete(this: *mut c_void) {
    boundary::destroy::<Negator>("Negator_88_op_delete", this);
}

/// Base-qualified call, what a host override reaches through `super()`
pub unsafe extern "C" fn Negator_88_negate(this: *mut c_void, i: i32) -> i32 {
    boundary::with_instance(
        "Negator_88_negate",
        this,
        |obj: &Negator| Ok(obj.base().negate_base(i)),
        Ok,
    )
}

/// Virtual call made from native code
pub unsafe extern "C" fn call_negate(this: *mut c_void, i: i32) -> i32 {
    boundary::with_instance("call_negate", this, |obj: &Negator| Ok(negate(obj, i)), Ok)
}

pub unsafe fn negator<'a>(this: *mut c_void) -> &'a Negator {
    &*this.cast::<Negator>()
}

// Host overrides

pub unsafe extern "C" fn host_doubles(_this: *mut c_void, i: i32) -> i32 {
    i * 2
}

pub unsafe extern "C" fn host_raises(_this: *mut c_void, _i: i32) -> i32 {
    let name = c_str("ValueError");
    let message = c_str("host refused");
    wl_set_error(name, message);
    wrapper_lib::ffi::wl_free(name.cast());
    wrapper_lib::ffi::wl_free(message.cast());
    0
}

/// `return super().negate(i) + 100`
pub unsafe extern "C" fn host_calls_super(this: *mut c_void, i: i32) -> i32 {
    Negator_88_negate(this, i) + 100
}

// ============================================================================
// Timer: holds a host callback object
// ============================================================================

#[derive(Clone)]
pub struct Timer {
    pub owner: UserData,
    pub interval: i32,
}

impl WrappedType for Timer {
    const CLASS_NAME: &'static str = "Timer";
}

pub extern "C" fn Timer_88_op_new(owner: *mut c_void, interval: i32) -> *mut c_void {
    boundary::construct("Timer_88_op_new", || {
        Ok(Timer {
            owner: UserData::from_handle(HostHandle::from_raw(owner)),
            interval,
        })
    })
}

pub unsafe extern "C" fn Timer_88_op_copy(other: *mut c_void) -> *mut c_void {
    boundary::with_instance(
        "Timer_88_op_copy",
        other,
        |timer: &Timer| Ok(wrapper_lib::Returned::CopyOf(timer).into_c()),
        Ok,
    )
}

pub unsafe extern "C" fn Timer_88_op_delete(this: *mut c_void) {
    boundary::destroy::<Timer>("Timer_88_op_delete", this);
}

pub unsafe extern "C" fn Timer_88_GetOwner(this: *mut c_void) -> *mut c_void {
    boundary::with_instance("Timer_88_GetOwner", this, |timer: &Timer| Ok(timer.owner.get_handle()), Ok)
}

// ============================================================================
// Label: string field
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Label {
    pub text: String,
}

impl WrappedType for Label {
    const CLASS_NAME: &'static str = "Label";
}

pub extern "C" fn Label_88_op_new() -> *mut c_void {
    boundary::construct("Label_88_op_new", || Ok(Label::default()))
}

pub unsafe extern "C" fn Label_88_op_delete(this: *mut c_void) {
    boundary::destroy::<Label>("Label_88_op_delete", this);
}

pub unsafe extern "C" fn Label_88_get_text(this: *mut c_void) -> *mut c_char {
    boundary::get_field("Label_88_get_text", this, |label: &Label| &label.text)
}

pub unsafe extern "C" fn Label_88_set_text(this: *mut c_void, text: *mut c_char) {
    boundary::set_field::<Label, String>("Label_88_set_text", this, text, |label| &mut label.text)
}

/// Abstract class: no constructor
pub extern "C" fn Shape_88_op_new() -> *mut c_void {
    boundary::reject_abstract("Shape_88_op_new", "Shape")
}

// ============================================================================
// Greeter: a virtual returning a mapped type, `greet(times) -> String`
// ============================================================================

pub struct GreeterBase;

impl GreeterBase {
    pub fn greet_base(&self, times: i32) -> String {
        "hello ".repeat(times.max(0) as usize).trim_end().to_string()
    }
}

impl WrappedType for GreeterBase {
    const CLASS_NAME: &'static str = "Greeter";
}

pub type Greeter = Overridable<GreeterBase>;

pub const METHIDX_GREETER_GREET: MethodIndex = MethodIndex::new(1);

/// The host returns a malloc'd string the library takes over
pub type GreetFn = unsafe extern "C" fn(*mut c_void, i32) -> *mut c_char;

pub fn greeter_table(greet: Option<GreetFn>) -> DispatchTable {
    let table = DispatchTable::new("Greeter", 2);
    if let Some(greet) = greet {
        table.set_slot(METHIDX_GREETER_GREET, greet).unwrap();
    }
    table
}

pub fn greet(this: &Greeter, times: i32) -> wrapper_lib::Result<String> {
    wrapper_lib::dispatch_virtual!(
        *this,
        METHIDX_GREETER_GREET,
        fn(times: i32) -> *mut c_char as String,
        |base: &GreeterBase| base.greet_base(times)
    )
}

/// Greeter instance of a host subclass; `overridden` sets the `greet` flag
pub fn new_greeter(table: &'static DispatchTable, overridden: bool) -> *mut c_void {
    boundary::construct("Greeter_88_op_new", || {
        let obj = Greeter::new(GreeterBase, table);
        obj.set_flag(METHIDX_GREETER_GREET, overridden)?;
        Ok(obj)
    })
}

pub unsafe extern "C" fn Greeter_88_op_delete(this: *mut c_void) {
    boundary::destroy::<Greeter>("Greeter_88_op_delete", this);
}

/// Virtual call made from native code, result handed back as `char*`
pub unsafe extern "C" fn call_greet(this: *mut c_void, times: i32) -> *mut c_char {
    use wrapper_lib::convert::MappedType;
    boundary::with_instance("call_greet", this, |obj: &Greeter| greet(obj, times), |s: String| s.to_c())
}

/// Number of strings `host_greets` handed out
pub static GREETINGS_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

pub unsafe extern "C" fn host_greets(_this: *mut c_void, times: i32) -> *mut c_char {
    GREETINGS_ALLOCATED.fetch_add(1, Ordering::Relaxed);
    c_str(&format!("host greets x{times}"))
}

pub unsafe extern "C" fn host_greet_raises(_this: *mut c_void, _times: i32) -> *mut c_char {
    let name = c_str("LookupError");
    let message = c_str("no greeting");
    wl_set_error(name, message);
    wrapper_lib::ffi::wl_free(name.cast());
    wrapper_lib::ffi::wl_free(message.cast());
    std::ptr::null_mut()
}
