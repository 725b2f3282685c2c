pub mod attribute;
pub mod filter;
pub mod kpv;
pub mod kti;
pub mod naming;
pub mod section;

pub use attribute::Attribute;
pub use filter::{Filter, WithinUse, Window};
pub use kpv::{KeyPointValue, KpvCollection, Mark};
pub use kti::{KeyTimeInstance, KtiCollection, StateChange};
pub use naming::{NameFormat, TemplateValue};
pub use section::{Edge, Section, SectionCollection};
