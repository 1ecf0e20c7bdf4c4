pub mod alert;
pub mod batch;
pub mod calibration;
pub mod file_formats;
pub mod observation;
pub mod pond;
pub mod treatment;
