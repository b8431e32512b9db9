#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use simlabel_image as image;

#[doc(inline)]
pub use simlabel_imgproc as imgproc;

#[doc(inline)]
pub use simlabel_geometry as geometry;

#[doc(inline)]
pub use simlabel_pnp as pnp;

#[doc(inline)]
pub use simlabel_qr as qr;

#[doc(inline)]
pub use simlabel_io as io;

#[doc(inline)]
pub use simlabel_overlay as overlay;

#[doc(inline)]
pub use simlabel_relay as relay;
