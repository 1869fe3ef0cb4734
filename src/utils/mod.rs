pub mod bitmap;
pub mod qrcode;
