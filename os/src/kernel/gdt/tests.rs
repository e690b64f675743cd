//! GDT subsystem tests
//!
//! These tests verify that the GDT and TSS are properly configured.

use super::*;
use crate::memlayout::KSTACKTOP;

fn leak_tss() -> &'static TaskState {
    Box::leak(Box::new(TaskState::for_kernel_stack(KSTACKTOP, KERNEL_DATA_SELECTOR)))
}

#[test]
fn selectors_match_fixed_layout() {
    assert_eq!(KERNEL_CODE_SELECTOR.0, 0x08);
    assert_eq!(KERNEL_DATA_SELECTOR.0, 0x10);
    assert_eq!(USER_CODE_SELECTOR.0, 0x1B);
    assert_eq!(USER_DATA_SELECTOR.0, 0x23);
    assert_eq!(TSS_SELECTOR.0, 0x28);
}

#[test]
fn tss_switches_to_kernel_stack_top() {
    let tss = TaskState::for_kernel_stack(KSTACKTOP, KERNEL_DATA_SELECTOR);

    assert_eq!(tss.esp0, KSTACKTOP);
    assert_eq!(tss.ss0, KERNEL_DATA_SELECTOR.0);
    assert_eq!(tss.kernel_stack_segment().0, 0x10);
    // No I/O permission bitmap.
    assert_eq!(tss.iomb as usize, core::mem::size_of::<TaskState>());
}

#[test]
fn flat_segments_encode_like_the_hardware_manual() {
    let gdt = GlobalDescriptorTable::new(leak_tss());

    assert_eq!(gdt.entry(0).map(SegmentDescriptor::as_u64), Some(0));
    assert_eq!(gdt.entry(1).map(SegmentDescriptor::as_u64), Some(0x00CF_9A00_0000_FFFF));
    assert_eq!(gdt.entry(2).map(SegmentDescriptor::as_u64), Some(0x00CF_9200_0000_FFFF));
    assert_eq!(gdt.entry(3).map(SegmentDescriptor::as_u64), Some(0x00CF_FA00_0000_FFFF));
    assert_eq!(gdt.entry(4).map(SegmentDescriptor::as_u64), Some(0x00CF_F200_0000_FFFF));
    assert_eq!(gdt.entry(GDT_ENTRIES), None);
}

#[test]
fn user_segments_carry_ring_3() {
    let gdt = GlobalDescriptorTable::new(leak_tss());

    let user_code = gdt.entry(3).unwrap();
    assert_eq!(user_code.dpl(), 3);
    assert!(user_code.flags().contains(DescriptorFlags::EXECUTABLE));

    let kernel_data = gdt.entry(2).unwrap();
    assert_eq!(kernel_data.dpl(), 0);
    assert!(!kernel_data.flags().contains(DescriptorFlags::EXECUTABLE));
}

#[test]
fn tss_descriptor_points_at_task_state() {
    let tss = leak_tss();
    let gdt = GlobalDescriptorTable::new(tss);
    let desc = gdt.entry(TSS_INDEX).unwrap();

    assert!(desc.is_present());
    assert_eq!(desc.system_type(), descriptor::STS_T32A);
    assert!(!desc.flags().contains(DescriptorFlags::USER_SEGMENT));
    assert_eq!(desc.dpl(), 0);
    assert_eq!(desc.base(), tss.base());
    assert_eq!(desc.limit(), 103);
}

#[test]
fn tss_descriptor_splits_base_and_limit() {
    let desc = SegmentDescriptor::task_state(0x1234_5678, 0x67);

    assert_eq!(desc.as_u64(), 0x1200_8934_5678_0067);
    assert_eq!(desc.base(), 0x1234_5678);
    assert_eq!(desc.limit(), 0x67);
}

#[test]
fn gdt_pointer_covers_all_entries() {
    let gdt: &'static GlobalDescriptorTable = Box::leak(Box::new(GlobalDescriptorTable::new(leak_tss())));
    let ptr = gdt.pointer();
    let limit = ptr.limit;
    let base = ptr.base;

    assert_eq!(limit as usize, GDT_ENTRIES * 8 - 1);
    assert_eq!(base, gdt.entries().as_ptr() as usize);
}
