pub mod dom_indices;
pub mod nice_html;
pub mod serialize;
