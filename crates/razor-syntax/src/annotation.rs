use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Payload = dyn Any + Send + Sync;

/// Opaque semantic payload attached to a green node out of band.
///
/// The `kind` names the payload in tree dumps; the payload itself is recovered
/// with [`Annotation::downcast_ref`].
#[derive(Clone)]
pub struct Annotation {
    kind: &'static str,
    payload: Arc<Payload>,
    fmt_payload: fn(&Payload, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl Annotation {
    pub fn new<T>(kind: &'static str, payload: T) -> Self
    where
        T: Any + fmt::Debug + Send + Sync,
    {
        Self { kind, payload: Arc::new(payload), fmt_payload: fmt_payload::<T> }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }
}

fn fmt_payload<T: Any + fmt::Debug>(payload: &Payload, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match payload.downcast_ref::<T>() {
        Some(payload) => fmt::Debug::fmt(payload, f),
        None => f.write_str("<?>"),
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.kind)?;
        (self.fmt_payload)(&*self.payload, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Bound(&'static str);

    #[test]
    fn downcasts_to_payload_type() {
        let annotation = Annotation::new("bound", Bound("asp-for"));
        assert_eq!(annotation.downcast_ref::<Bound>(), Some(&Bound("asp-for")));
        assert!(annotation.downcast_ref::<String>().is_none());
        assert_eq!(format!("{annotation:?}"), r#"bound:Bound("asp-for")"#);
    }
}
