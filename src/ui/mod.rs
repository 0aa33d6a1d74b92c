pub(crate) mod exclusive;
