// hidscope - shared library
// Module dependency manifest and the virtual-input snapshot state used by
// the CLI's tracking mode.

pub mod manifest;
pub mod vinput;

pub use manifest::{find_module, validate, ManifestError, ModuleDescriptor, MODULES};
pub use vinput::{InputEvent, VirtualInputState, SLOT_COUNT};
