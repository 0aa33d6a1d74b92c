use serde::Deserializer;
use std::{fmt::Display, marker::PhantomData, str::FromStr};

macro_rules! impl_deserialize_from_str {
    ($ty:ty) => {
        impl<'de> serde::de::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                $crate::utils::deserialize_from_str(deserializer)
            }
        }
    };
}

pub(crate) use impl_deserialize_from_str;

/// Deserializes any type that can be parsed out of a string.
pub(crate) fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    struct Visitor<S>(PhantomData<S>);

    impl<S> serde::de::Visitor<'_> for Visitor<S>
    where
        S: FromStr,
        <S as FromStr>::Err: Display,
    {
        type Value = S;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value.parse::<S>().map_err(serde::de::Error::custom)
        }
    }

    deserializer.deserialize_str(Visitor(PhantomData))
}
