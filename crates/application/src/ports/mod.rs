//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod generative_port;
mod messenger_port;
mod page_rasterizer_port;

#[cfg(test)]
pub use generative_port::MockGenerativePort;
pub use generative_port::{GeneratedReply, GenerativePort, UploadedAsset};
#[cfg(test)]
pub use messenger_port::MockMessengerPort;
pub use messenger_port::{DownloadedMedia, MessengerPort};
#[cfg(test)]
pub use page_rasterizer_port::MockPageRasterizerPort;
pub use page_rasterizer_port::PageRasterizerPort;
