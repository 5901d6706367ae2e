//! Global Descriptor Table selectors.
//!
//! The process core never loads the GDT itself; the boot path does. It only
//! needs the kernel code-segment selector when it builds the first context
//! of a fresh (non-forked) task.

use lazy_static::lazy_static;
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable, SegmentSelector};

lazy_static! {
    /// Kernel GDT and the selectors of its segments.
    static ref GDT: (GlobalDescriptorTable, Selectors) = {
        let mut gdt = GlobalDescriptorTable::new();

        // Kernel code segment (ring 0, executable)
        let code_selector = gdt.append(Descriptor::kernel_code_segment());

        // Kernel data segment (ring 0, read/write)
        let data_selector = gdt.append(Descriptor::kernel_data_segment());

        (gdt, Selectors {
            code_selector,
            data_selector,
        })
    };
}

/// Segment selectors.
struct Selectors {
    code_selector: SegmentSelector,
    data_selector: SegmentSelector,
}

/// Kernel code-segment selector stored in the `cs` slot of new contexts.
pub fn code_selector() -> SegmentSelector {
    GDT.1.code_selector
}

/// Kernel data-segment selector.
pub fn data_selector() -> SegmentSelector {
    GDT.1.data_selector
}
