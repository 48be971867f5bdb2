//! Register emission.
//!
//! The derivation layer produces plain structs; this layer walks them once
//! per slice and turns them into `(addr, value)` register writes. The walk
//! is sink-agnostic: the same pass feeds either a [`CommandQueue`] (for the
//! hardware command unit to replay) or a [`DirectWriter`] over a live
//! register bus.

pub mod regs;
pub mod slices;

pub use slices::{emit_frame, emit_slice, SlicePathState, SliceState, TriggerMode};

/// Where derived register writes go.
pub trait RegSink {
    fn push(&mut self, addr: u32, value: u32);
}

/// One register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegCommand {
    pub addr: u32,
    pub value: u32,
}

/// Buffers writes for the hardware command unit to replay.
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    cmds: Vec<RegCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn commands(&self) -> &[RegCommand] {
        &self.cmds
    }

    pub fn into_commands(self) -> Vec<RegCommand> {
        self.cmds
    }
}

impl RegSink for CommandQueue {
    fn push(&mut self, addr: u32, value: u32) {
        self.cmds.push(RegCommand { addr, value });
    }
}

/// Synchronous register access.
pub trait RegisterBus {
    fn write(&mut self, addr: u32, value: u32);
}

/// Sink that applies each write immediately through a bus.
pub struct DirectWriter<'a, B: RegisterBus> {
    bus: &'a mut B,
}

impl<'a, B: RegisterBus> DirectWriter<'a, B> {
    pub fn new(bus: &'a mut B) -> Self {
        Self { bus }
    }
}

impl<B: RegisterBus> RegSink for DirectWriter<'_, B> {
    fn push(&mut self, addr: u32, value: u32) {
        self.bus.write(addr, value);
    }
}

/// Recording bus for tests.
#[derive(Clone, Debug, Default)]
pub struct MockBus {
    pub writes: Vec<RegCommand>,
}

impl RegisterBus for MockBus {
    fn write(&mut self, addr: u32, value: u32) {
        self.writes.push(RegCommand { addr, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_write_order() {
        let mut q = CommandQueue::new();
        q.push(0x10, 1);
        q.push(0x14, 2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.commands()[0], RegCommand { addr: 0x10, value: 1 });
        assert_eq!(q.commands()[1], RegCommand { addr: 0x14, value: 2 });
    }

    #[test]
    fn direct_writer_passes_through() {
        let mut bus = MockBus::default();
        let mut w = DirectWriter::new(&mut bus);
        w.push(0x3400, 0xdead);
        assert_eq!(bus.writes, vec![RegCommand { addr: 0x3400, value: 0xdead }]);
    }
}
