pub mod acta;

pub use acta::ActaStorage;
