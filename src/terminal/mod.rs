pub(crate) mod ansi;
pub(crate) mod printer;
#[cfg(test)]
pub(crate) mod virt;
