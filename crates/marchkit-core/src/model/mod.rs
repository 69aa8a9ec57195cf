pub mod marcher;
pub mod marcher_page;
pub mod page;

pub use marcher::{Marcher, MarcherUpdate, NewMarcher};
pub use marcher_page::{MarcherPage, MarcherPageFilter, MarcherPageUpdate};
pub use page::{NewPage, Page, PageUpdate};
