use std::{any::type_name, fmt, marker::PhantomData, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::event::{Abs, EventType, Key, Led, Rel};

/// Accepts either a constant name (`KEY_A`) or a raw code.
struct NameOrCode<T> {
    from_raw: fn(u16) -> T,
    _p: PhantomData<T>,
}

impl<T> NameOrCode<T> {
    fn new(from_raw: fn(u16) -> T) -> Self {
        Self {
            from_raw,
            _p: PhantomData,
        }
    }

    fn code<E: de::Error>(&self, v: u64) -> Result<T, E> {
        match u16::try_from(v) {
            Ok(raw) => Ok((self.from_raw)(raw)),
            Err(_) => Err(E::invalid_value(
                de::Unexpected::Unsigned(v),
                &"unsigned 16-bit code",
            )),
        }
    }
}

impl<'de, T: FromStr> de::Visitor<'de> for NameOrCode<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a `{}` constant name or raw code", type_name::<T>())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        T::from_str(v)
            .map_err(|_| E::custom(format!("unknown `{}` name '{v}'", type_name::<T>())))
    }

    fn visit_u16<E: de::Error>(self, v: u16) -> Result<T, E> {
        Ok((self.from_raw)(v))
    }

    fn visit_u32<E: de::Error>(self, v: u32) -> Result<T, E> {
        self.code(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        self.code(v)
    }
}

macro_rules! serde_impls {
    ( $($t:ident),* ) => {
        $(
            impl<'de> Deserialize<'de> for $t {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    if deserializer.is_human_readable() {
                        // Human-readable formats are assumed to be self-describing.
                        deserializer.deserialize_any(NameOrCode::new(<$t>::from_raw))
                    } else {
                        u16::deserialize(deserializer).map(<$t>::from_raw)
                    }
                }
            }

            impl Serialize for $t {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    match self.name() {
                        Some(name) if serializer.is_human_readable() => {
                            serializer.collect_str(&name)
                        }
                        _ => self.raw().serialize(serializer),
                    }
                }
            }
        )*
    };
}

serde_impls!(EventType, Key, Rel, Abs, Led);

#[cfg(test)]
mod tests {
    use csv::{ReaderBuilder, WriterBuilder};

    use super::*;

    #[test]
    fn csv() {
        let mut out = Vec::new();
        let mut w = WriterBuilder::new().from_writer(&mut out);
        w.serialize(Key::KEY_ESC).unwrap();
        w.serialize(Key::from_raw(0xffff)).unwrap();
        w.serialize(Abs::HAT0X).unwrap();
        w.flush().unwrap();
        drop(w);

        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, "KEY_ESC\n65535\nABS_HAT0X\n");

        let mut r = ReaderBuilder::new()
            .has_headers(false)
            .from_reader(s.as_bytes());
        let mut records = r.records();
        let mut next = || records.next().unwrap().unwrap();
        assert_eq!(next().deserialize::<Key>(None).unwrap(), Key::KEY_ESC);
        assert_eq!(next().deserialize::<Key>(None).unwrap(), Key::from_raw(0xffff));
        assert_eq!(next().deserialize::<Abs>(None).unwrap(), Abs::HAT0X);

        let bogus = csv::StringRecord::from(vec!["KEY_NOPE"]);
        assert!(bogus.deserialize::<Key>(None).is_err());
    }

    #[test]
    fn postcard() {
        let b = postcard::to_allocvec(&EventType::KEY).unwrap();
        assert_eq!(b, postcard::to_allocvec(&1u16).unwrap());
        assert_eq!(postcard::from_bytes::<EventType>(&b).unwrap(), EventType::KEY);

        let b = postcard::to_allocvec(&Led::from_raw(0xfff0)).unwrap();
        assert_eq!(postcard::from_bytes::<Led>(&b).unwrap(), Led::from_raw(0xfff0));
    }
}
