#![allow(missing_copy_implementations, missing_debug_implementations)]

//! Measurement-based profiler, gated behind the `profiler` feature.

#[cfg(feature = "profiler")]
use measureme::{EventId, Profiler as SelfProfiler, TimingGuard};
#[cfg(feature = "profiler")]
use once_cell::sync::OnceCell;
use std::fmt::{self, Debug};
#[cfg(feature = "profiler")]
use std::{
    path::Path,
    thread::{current, ThreadId},
};

#[cfg(feature = "profiler")]
pub struct Profiler {
    profiler: SelfProfiler,
}

/// This static instance should never be public, and its only access should be
/// done through the `global()` and `drop()` methods.
#[cfg(feature = "profiler")]
static mut INSTANCE: OnceCell<Profiler> = OnceCell::new();

#[cfg(feature = "profiler")]
impl Profiler {
    pub fn start_event(&self, label: &str, category: &str) -> TimingGuard<'_> {
        let kind = self.profiler.alloc_string(category);
        let id = EventId::from_label(self.profiler.alloc_string(label));
        let thread_id = Self::thread_id_to_u32(current().id());
        self.profiler
            .start_recording_interval_event(kind, id, thread_id)
    }

    pub fn default() -> Self {
        let profiler =
            SelfProfiler::new(Path::new("./trace")).expect("must be able to create trace file");
        Self { profiler }
    }

    pub fn global() -> &'static Self {
        unsafe { INSTANCE.get_or_init(Self::default) }
    }

    pub fn drop(&self) {
        // To drop the instance we need ownership of it, which isn't possible
        // on a static unless it is mutable.
        unsafe {
            INSTANCE
                .take()
                .expect("Could not take back profiler instance");
        }
    }

    fn thread_id_to_u32(tid: ThreadId) -> u32 {
        unsafe { std::mem::transmute::<ThreadId, u64>(tid) as u32 }
    }
}

impl Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt("no debug implemented", f)
    }
}

#[cfg(not(feature = "profiler"))]
pub struct Profiler;

#[allow(clippy::unused_unit, clippy::unused_self)]
#[cfg(not(feature = "profiler"))]
impl Profiler {
    pub fn start_event(&self, _label: &str, _category: &str) -> () {}

    pub fn drop(&self) {}

    pub fn global() -> Self {
        Self
    }
}
