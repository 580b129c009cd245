//! Reusable presentation behaviour shared by the pages.

/// Carousel index arithmetic and auto-advance
pub mod carousel;
/// Infinite-scroll and reveal-on-scroll triggers
pub mod observer;
/// Skeleton, empty, error and not-found states
pub mod placeholder;
/// Success and error toasts
pub mod toast;

pub use carousel::Carousel;
pub use observer::{BatchReveal, InfiniteScroll, ScrollReveal};
pub use placeholder::Placeholder;
pub use toast::{Toast, ToastKind, Toaster};
