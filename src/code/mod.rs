pub(crate) mod execute;
pub(crate) mod highlighting;
pub(crate) mod sandbox;
pub(crate) mod snippet;
