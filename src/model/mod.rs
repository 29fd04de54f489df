pub mod dicom_slice;
pub mod loader;
pub mod stack;

pub use dicom_slice::DicomSlice;
pub use stack::StackViewport;
