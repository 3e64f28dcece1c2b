// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Scratch-register slot allocation.
//!
//! Lifter temporaries and synthesized scratch values share one flat
//! namespace partitioned by slot number. A lifter name is bound to a slot
//! on first mention and keeps it for the rest of the machine instruction;
//! fresh allocations skip slots that are already bound.

use log::debug;

/// Allocates stable `V_NN` slot names. State lives for one machine
/// instruction and is cleared by [`TempAlloc::reset`].
#[derive(Debug, Default)]
pub struct TempAlloc {
    next: u32,
    bound: Vec<(u32, String)>,
    trace: bool,
}

impl TempAlloc {
    pub fn new(trace: bool) -> TempAlloc {
        TempAlloc { next: 0, bound: Vec::new(), trace }
    }

    /// Clear the counter and all name bindings.
    pub fn reset(&mut self) {
        self.next = 0;
        self.bound.clear();
    }

    /// Slot name for a lifter temporary, binding a fresh slot on first use.
    pub fn name_for(&mut self, name: &str) -> String {
        if let Some(slot) = self.find(name) {
            if self.trace {
                debug!("temp slot {} found for {}", slot, name);
            }
            return Self::slot_name(slot);
        }

        let slot = self.alloc();
        self.bound.push((slot, name.to_string()));
        if self.trace {
            debug!("temp slot {} reserved for {}", slot, name);
        }
        Self::slot_name(slot)
    }

    /// Allocate the lowest free slot at or past the counter and advance
    /// the counter beyond it.
    pub fn alloc(&mut self) -> u32 {
        loop {
            let slot = self.next;
            self.next += 1;
            if !self.bound.iter().any(|(n, _)| *n == slot) {
                return slot;
            }
        }
    }

    /// Render a slot number as its register name.
    pub fn slot_name(slot: u32) -> String {
        format!("V_{:02}", slot)
    }

    fn find(&self, name: &str) -> Option<u32> {
        self.bound
            .iter()
            .find(|(_, bound_name)| bound_name == name)
            .map(|(slot, _)| *slot)
    }
}
