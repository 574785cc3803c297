// Fixed feed-forward classifier: a stack of fully connected layers

mod activation;
pub use activation::Activation;

mod layer;
pub use layer::Layer;

mod model;
pub use model::{NetworkModel, Probabilities};

mod init;
pub use init::Initializer;

mod file;
pub use file::ModelFile;
