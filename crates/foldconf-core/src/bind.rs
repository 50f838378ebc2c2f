//! Struct population from a Config
//!
//! A record exposes its bindable fields through [`Bind::fields`], each
//! with a `section-option` tag and a typed [`Slot`] pointing at the
//! field. [`populate`] walks the fields in declaration order, reads the
//! bound option through the typed accessors and writes the converted
//! value into the slot.
//!
//! ```rust
//! use foldconf_core::{bind_fields, Config};
//!
//! #[derive(Default)]
//! struct Web {
//!     host: String,
//!     port: u16,
//!     aliases: Vec<String>,
//! }
//!
//! bind_fields!(Web {
//!     host => "web-host",
//!     port => "web-port",
//!     aliases => "web-aliases",
//! });
//!
//! let config = Config::from_ini("[web]\nhost = example.org\nport = 8080\naliases = a,b\n").unwrap();
//! let mut web = Web::default();
//! config.populate(&mut web).unwrap();
//! assert_eq!(web.port, 8080);
//! assert_eq!(web.aliases, vec!["a", "b"]);
//! ```

use crate::config::{parse_bool, Config};
use crate::error::{Error, Result};

/// Separator between slice elements in an option value
pub const SEQ_SEPARATOR: char = ',';

/// A record whose fields can be filled from a Config
pub trait Bind {
    /// The record's fields, in declaration order
    fn fields(&mut self) -> Vec<Field<'_>>;
}

impl<T: Bind + ?Sized> Bind for Box<T> {
    fn fields(&mut self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

/// The section/option pair a field pulls its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub section: String,
    pub option: String,
}

impl Binding {
    /// Parse a `section-option` tag.
    ///
    /// `-`, an empty tag, a tag without `-` or with an empty side binds
    /// nothing. Only the first `-` separates, so option names may
    /// contain dashes.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() || tag == "-" {
            return None;
        }
        let (section, option) = tag.split_once('-')?;
        let (section, option) = (section.trim(), option.trim());
        if section.is_empty() || option.is_empty() {
            return None;
        }
        Some(Self {
            section: section.to_string(),
            option: option.to_string(),
        })
    }

    fn path(&self) -> String {
        format!("{}.{}", self.section, self.option)
    }
}

/// A signed integer destination
pub trait IntSlot {
    /// Store `value`, failing if it does not fit
    fn set_i64(&mut self, value: i64) -> std::result::Result<(), String>;
}

/// An unsigned integer destination
pub trait UintSlot {
    /// Store `value`, failing if it is negative or does not fit
    fn set_i64(&mut self, value: i64) -> std::result::Result<(), String>;
}

macro_rules! int_slots {
    ($trait:ident, $variant:ident: $($t:ty),*) => {
        $(
            impl $trait for $t {
                fn set_i64(&mut self, value: i64) -> std::result::Result<(), String> {
                    *self = <$t>::try_from(value).map_err(|_| {
                        format!("value {} out of range for {}", value, stringify!($t))
                    })?;
                    Ok(())
                }
            }

            impl<'a> IntoSlot<'a> for &'a mut $t {
                fn into_slot(self) -> Slot<'a> {
                    Slot::$variant(self)
                }
            }
        )*
    };
}

/// A slice element type
pub trait Element: Sized {
    /// Convert one comma-separated piece
    fn convert(raw: &str) -> std::result::Result<Self, String>;
}

impl Element for String {
    fn convert(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl Element for bool {
    fn convert(raw: &str) -> std::result::Result<Self, String> {
        parse_bool(raw).ok_or_else(|| format!("could not parse bool value: {}", raw))
    }
}

macro_rules! int_elements {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn convert(raw: &str) -> std::result::Result<Self, String> {
                    let wide: i64 = raw
                        .parse()
                        .map_err(|e| format!("could not parse integer value '{}': {}", raw, e))?;
                    <$t>::try_from(wide)
                        .map_err(|_| format!("value {} out of range for {}", wide, stringify!($t)))
                }
            }
        )*
    };
}

macro_rules! float_elements {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn convert(raw: &str) -> std::result::Result<Self, String> {
                    raw.parse()
                        .map_err(|e| format!("could not parse float value '{}': {}", raw, e))
                }
            }
        )*
    };
}

int_elements!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
float_elements!(f32, f64);

/// A slice destination
pub trait SeqSlot {
    /// Convert every piece and replace the slice; on error the slice is untouched
    fn assign(&mut self, pieces: &[&str]) -> std::result::Result<(), String>;
}

impl<T: Element> SeqSlot for Vec<T> {
    fn assign(&mut self, pieces: &[&str]) -> std::result::Result<(), String> {
        let converted = pieces
            .iter()
            .map(|p| T::convert(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        *self = converted;
        Ok(())
    }
}

/// A typed handle to a destination field
pub enum Slot<'a> {
    Int(&'a mut dyn IntSlot),
    Uint(&'a mut dyn UintSlot),
    Bool(&'a mut bool),
    Str(&'a mut String),
    Seq(&'a mut dyn SeqSlot),
    /// A field kind the binder cannot fill, e.g. "float64" or "map"
    Other { kind: &'static str },
}

impl Slot<'_> {
    /// Name of the field kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Int(_) => "int",
            Slot::Uint(_) => "uint",
            Slot::Bool(_) => "bool",
            Slot::Str(_) => "string",
            Slot::Seq(_) => "slice",
            Slot::Other { kind } => *kind,
        }
    }
}

/// Conversion of a field reference into a [`Slot`]
pub trait IntoSlot<'a> {
    fn into_slot(self) -> Slot<'a>;
}

impl<'a> IntoSlot<'a> for Slot<'a> {
    fn into_slot(self) -> Slot<'a> {
        self
    }
}

int_slots!(IntSlot, Int: i8, i16, i32, i64, isize);
int_slots!(UintSlot, Uint: u8, u16, u32, u64, usize);

impl<'a> IntoSlot<'a> for &'a mut bool {
    fn into_slot(self) -> Slot<'a> {
        Slot::Bool(self)
    }
}

impl<'a> IntoSlot<'a> for &'a mut String {
    fn into_slot(self) -> Slot<'a> {
        Slot::Str(self)
    }
}

impl<'a, T: Element + 'a> IntoSlot<'a> for &'a mut Vec<T> {
    fn into_slot(self) -> Slot<'a> {
        Slot::Seq(self)
    }
}

// Scalar floats have no binder conversion; only slices of them do.
impl<'a> IntoSlot<'a> for &'a mut f32 {
    fn into_slot(self) -> Slot<'a> {
        Slot::Other { kind: "float32" }
    }
}

impl<'a> IntoSlot<'a> for &'a mut f64 {
    fn into_slot(self) -> Slot<'a> {
        Slot::Other { kind: "float64" }
    }
}

/// One field of a record
pub struct Field<'a> {
    tag: Option<&'static str>,
    embedded: bool,
    slot: Slot<'a>,
}

impl<'a> Field<'a> {
    /// A field bound by a `section-option` tag
    pub fn new(tag: &'static str, slot: impl IntoSlot<'a>) -> Self {
        Self {
            tag: Some(tag),
            embedded: false,
            slot: slot.into_slot(),
        }
    }

    /// A field without a tag; never bound
    pub fn untagged(slot: impl IntoSlot<'a>) -> Self {
        Self {
            tag: None,
            embedded: false,
            slot: slot.into_slot(),
        }
    }

    /// An embedded record; always skipped
    pub fn embedded() -> Self {
        Self {
            tag: None,
            embedded: true,
            slot: Slot::Other { kind: "struct" },
        }
    }

    /// The field's binding, derived from its tag on every call
    pub fn binding(&self) -> Option<Binding> {
        if self.embedded {
            return None;
        }
        self.tag.and_then(Binding::parse)
    }
}

/// Where [`populate`] writes to
pub enum Target<'a> {
    /// The record itself
    Record(&'a mut dyn Bind),
    /// A nullable handle to the record
    Indirect(Option<&'a mut dyn Bind>),
    /// Anything that is not a record
    Unsupported { kind: &'static str },
}

impl<'a, T: Bind> From<&'a mut T> for Target<'a> {
    fn from(record: &'a mut T) -> Self {
        Target::Record(record)
    }
}

impl<'a, T: Bind> From<&'a mut Option<T>> for Target<'a> {
    fn from(slot: &'a mut Option<T>) -> Self {
        Target::indirect(slot)
    }
}

impl<'a> Target<'a> {
    /// Follow an optional record (boxed records included)
    pub fn indirect<T: Bind>(slot: &'a mut Option<T>) -> Self {
        Target::Indirect(slot.as_mut().map(|r| r as &mut dyn Bind))
    }

    /// Resolve to the record, or fail with an unsupported type error
    pub fn into_record(self) -> Result<&'a mut dyn Bind> {
        match self {
            Target::Record(record) | Target::Indirect(Some(record)) => Ok(record),
            Target::Indirect(None) => Err(Error::unsupported_type("nil")),
            Target::Unsupported { kind } => Err(Error::unsupported_type(kind)),
        }
    }
}

/// Fill every bound field of `target` from `config`.
///
/// A field whose option is missing keeps its value and population moves
/// on. Any other error stops population and is returned as is; fields
/// filled before it keep their new values.
pub fn populate(target: Target<'_>, config: &Config) -> Result<()> {
    let record = target.into_record()?;
    for field in record.fields() {
        let Some(binding) = field.binding() else {
            log::debug!("skipping unbound {} field", field.slot.kind());
            continue;
        };
        match load_field(field.slot, &binding, config) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::debug!("{} not set, keeping field default", binding.path());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn load_field(slot: Slot<'_>, binding: &Binding, config: &Config) -> Result<()> {
    let (section, option) = (binding.section.as_str(), binding.option.as_str());
    log::trace!("loading {} field from {}", slot.kind(), binding.path());

    match slot {
        Slot::Int(field) => {
            let value = config.get_i64(section, option)?;
            field
                .set_i64(value)
                .map_err(|m| Error::type_conversion(binding.path(), m))
        }
        Slot::Uint(field) => {
            let value = config.get_i64(section, option)?;
            field
                .set_i64(value)
                .map_err(|m| Error::type_conversion(binding.path(), m))
        }
        Slot::Bool(field) => {
            *field = config.get_bool(section, option)?;
            Ok(())
        }
        Slot::Str(field) => {
            *field = config.get_string(section, option)?;
            Ok(())
        }
        Slot::Seq(field) => {
            let value = config.get_string(section, option)?;
            let pieces: Vec<&str> = value.split(SEQ_SEPARATOR).collect();
            field
                .assign(&pieces)
                .map_err(|m| Error::type_conversion(binding.path(), m))
        }
        Slot::Other { kind } => Err(Error::unsupported_type(kind)
            .with_path(format!("[{}-{}]", section, option))),
    }
}

/// Implement [`Bind`] for a struct from `field => "section-option"` pairs.
///
/// Fields are bound in the listed order; unlisted fields are left alone.
#[macro_export]
macro_rules! bind_fields {
    ($ty:ty { $($field:ident => $tag:literal),* $(,)? }) => {
        impl $crate::bind::Bind for $ty {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::bind::Field<'_>> {
                ::std::vec![$($crate::bind::Field::new($tag, &mut self.$field)),*]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resolver::MapEnv;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        workers: i32,
        debug: bool,
        tags: Vec<String>,
        weights: Vec<f64>,
        ids: Vec<u8>,
        flags: Vec<bool>,
        skipped: String,
        untagged: String,
        timeout: i64,
    }

    impl Bind for Server {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::embedded(),
                Field::new("server-host", &mut self.host),
                Field::new("server-port", &mut self.port),
                Field::new("server-workers", &mut self.workers),
                Field::new("server-debug", &mut self.debug),
                Field::new("server-tags", &mut self.tags),
                Field::new("server-weights", &mut self.weights),
                Field::new("server-ids", &mut self.ids),
                Field::new("server-flags", &mut self.flags),
                Field::new("-", &mut self.skipped),
                Field::untagged(&mut self.untagged),
                Field::new("server-timeout", &mut self.timeout),
            ]
        }
    }

    const SERVER_INI: &str = r#"
base_host = localhost

[server]
host = %(base_host)s
port = 8080
workers = -4
debug = yes
tags = a,b,c
weights = 0.5,1.5
ids = 1,2,255
flags = on,OFF,1
skipped = nope
untagged = nope
"#;

    #[test]
    fn test_populate_all_kinds() {
        let config = Config::from_ini(SERVER_INI).unwrap();
        let mut server = Server {
            timeout: 30,
            ..Default::default()
        };

        config.populate(&mut server).unwrap();

        assert_eq!(
            server,
            Server {
                host: "localhost".into(),
                port: 8080,
                workers: -4,
                debug: true,
                tags: vec!["a".into(), "b".into(), "c".into()],
                weights: vec![0.5, 1.5],
                ids: vec![1, 2, 255],
                flags: vec![true, false, true],
                skipped: String::new(),
                untagged: String::new(),
                timeout: 30,
            }
        );
    }

    #[test]
    fn test_missing_option_keeps_default_and_continues() {
        let config = Config::from_ini("[server]\nport = 1\ntimeout = 9\n").unwrap();
        let mut server = Server {
            host: "keep".into(),
            ..Default::default()
        };

        config.populate(&mut server).unwrap();

        assert_eq!(server.host, "keep");
        assert_eq!(server.port, 1);
        assert_eq!(server.timeout, 9);
    }

    #[test]
    fn test_empty_value_gives_one_empty_element() {
        let config = Config::from_ini("[server]\ntags =\n").unwrap();
        let mut server = Server::default();

        config.populate(&mut server).unwrap();

        assert_eq!(server.tags, vec![String::new()]);
    }

    #[test]
    fn test_bad_element_aborts() {
        let config = Config::from_ini("[server]\nport = 80\nids = 1,x\ntimeout = 5\n").unwrap();
        let mut server = Server::default();

        let err = config.populate(&mut server).unwrap_err();

        assert_eq!(err.kind, ErrorKind::TypeConversion);
        assert_eq!(err.path, Some("server.ids".into()));
        assert_eq!(server.port, 80);
        assert!(server.ids.is_empty());
        assert_eq!(server.timeout, 0);
    }

    #[test]
    fn test_bad_bool_aborts() {
        let config = Config::from_ini("[server]\ndebug = maybe\n").unwrap();
        let err = config.populate(&mut Server::default()).unwrap_err();
        assert!(err.to_string().contains("could not parse bool value: maybe"));
    }

    #[test]
    fn test_unresolved_reference_aborts() {
        let config = Config::from_ini("[server]\nhost = %(nowhere)s\nport = 1\n").unwrap();
        let mut server = Server::default();

        let err = config.populate(&mut server).unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::UnresolvedReference {
                name: "nowhere".into()
            }
        );
        assert_eq!(server.port, 0);
    }

    #[test]
    fn test_environment_reference_in_field() {
        let config = Config::from_ini("[server]\nhost = ${SERVER_HOST}\n")
            .unwrap()
            .with_environment(MapEnv::new().with("SERVER_HOST", "db.internal"));
        let mut server = Server::default();

        config.populate(&mut server).unwrap();

        assert_eq!(server.host, "db.internal");
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        let config = Config::from_ini("[server]\nport = -1\n").unwrap();
        let err = config.populate(&mut Server::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeConversion);
        assert!(err.to_string().contains("out of range for u16"));
    }

    #[test]
    fn test_signed_range_checked() {
        #[derive(Default)]
        struct Small {
            level: i8,
        }
        bind_fields!(Small { level => "log-level" });

        let config = Config::from_ini("[log]\nlevel = 300\n").unwrap();
        let err = config.populate(&mut Small::default()).unwrap_err();
        assert!(err.to_string().contains("out of range for i8"));

        let config = Config::from_ini("[log]\nlevel = -3\n").unwrap();
        let mut small = Small::default();
        config.populate(&mut small).unwrap();
        assert_eq!(small.level, -3);
    }

    #[derive(Debug, Default)]
    struct WithFloat {
        name: String,
        ratio: f64,
        after: String,
    }

    bind_fields!(WithFloat {
        name => "calc-name",
        ratio => "calc-ratio",
        after => "calc-after",
    });

    #[test]
    fn test_unsupported_field_kind() {
        let config = Config::from_ini("[calc]\nname = n\nafter = a\n").unwrap();
        let mut calc = WithFloat::default();

        let err = config.populate(&mut calc).unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedType {
                kind: "float64".into()
            }
        );
        assert_eq!(err.path, Some("[calc-ratio]".into()));
        let display = err.to_string();
        assert_eq!(display.lines().next(), Some("unsupported type: float64"));
        assert!(display.contains("Path: [calc-ratio]"));
        assert_eq!(calc.name, "n");
        assert_eq!(calc.after, "");
    }

    #[test]
    fn test_float_slices() {
        #[derive(Default)]
        struct Curve {
            points: Vec<f32>,
        }
        bind_fields!(Curve { points => "curve-points" });

        let config = Config::from_ini("[curve]\npoints = 0.25,1,-2.5\n").unwrap();
        let mut curve = Curve::default();
        config.populate(&mut curve).unwrap();
        assert_eq!(curve.points, vec![0.25f32, 1.0, -2.5]);
    }

    #[test]
    fn test_indirect_targets() {
        let config = Config::from_ini("[server]\nport = 7\n").unwrap();

        let mut present = Some(Server::default());
        config.populate(Target::indirect(&mut present)).unwrap();
        assert_eq!(present.map(|s| s.port), Some(7));

        let mut boxed = Some(Box::new(Server::default()));
        config.populate(Target::indirect(&mut boxed)).unwrap();
        assert_eq!(boxed.map(|s| s.port), Some(7));

        let mut direct_box = Box::new(Server::default());
        config.populate(&mut direct_box).unwrap();
        assert_eq!(direct_box.port, 7);
    }

    #[test]
    fn test_optional_records_convert_directly() {
        let config = Config::from_ini("[server]\nport = 9\ndebug = on\n").unwrap();

        let mut present = Some(Server::default());
        config.populate(&mut present).unwrap();
        assert_eq!(present.as_ref().map(|s| (s.port, s.debug)), Some((9, true)));

        let mut boxed = Some(Box::new(Server::default()));
        config.populate(&mut boxed).unwrap();
        assert_eq!(boxed.map(|s| s.port), Some(9));

        let mut absent: Option<Box<Server>> = None;
        let err = config.populate(&mut absent).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType { kind: "nil".into() });
    }

    #[test]
    fn test_tag_splits_on_first_dash() {
        #[derive(Default)]
        struct Pool {
            conns: i32,
        }
        bind_fields!(Pool { conns => "web-max-conns" });

        let config = Config::from_ini("[web]\nmax = 1\nmax-conns = 2\n").unwrap();
        let mut pool = Pool::default();
        config.populate(&mut pool).unwrap();
        assert_eq!(pool.conns, 2);
    }

    #[test]
    fn test_unsupported_targets() {
        let config = Config::from_ini("[server]\nport = 7\n").unwrap();

        let mut absent: Option<Server> = None;
        let err = config.populate(Target::indirect(&mut absent)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType { kind: "nil".into() });

        let err = config
            .populate(Target::Unsupported { kind: "int" })
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType { kind: "int".into() });
    }

    #[test]
    fn test_binding_parse() {
        assert_eq!(
            Binding::parse("web-port"),
            Some(Binding {
                section: "web".into(),
                option: "port".into()
            })
        );
        assert_eq!(
            Binding::parse(" web - max-conns "),
            Some(Binding {
                section: "web".into(),
                option: "max-conns".into()
            })
        );
        assert_eq!(Binding::parse("-"), None);
        assert_eq!(Binding::parse(""), None);
        assert_eq!(Binding::parse("noseparator"), None);
        assert_eq!(Binding::parse("web-"), None);
        assert_eq!(Binding::parse("-port"), None);
    }

    #[test]
    fn test_embedded_field_never_binds() {
        assert_eq!(Field::embedded().binding(), None);
        let mut s = String::new();
        assert_eq!(Field::untagged(&mut s).binding(), None);
    }
}
