//! Recursive comparator engine.
//!
//! Walks two values in lock-step. At every level class overrides are tried
//! first, then type overrides, then the structural rules. Once the depth
//! budget is spent, children are compared by strict identity only, so the
//! walk always terminates. Left-hand ancestors already on the current branch
//! compare equal, which makes self-referential structures safe.
//!
//! Nesting is tracked on an explicit frame stack rather than the call stack,
//! so arbitrarily deep acyclic values compare without exhausting it.

use tracing::trace;

use crate::config::{ClassOverride, Compare, Configuration, TypeKey, TypeOverrides};
use crate::value::{Array, Object, Value};

/// Compares `lhs` and `rhs` with `config` as given, descending at most
/// `depth` levels. A non-zero `config.params.depth` takes precedence over
/// `depth`.
///
/// Built-in defaults are not layered in; see [`crate::process_options`].
pub fn compare<O: Default>(lhs: &Value, rhs: &Value, config: &Configuration<O>, depth: usize) -> bool {
    let params = config.params_or_default();
    let max_depth = params.depth.filter(|&d| d > 0).unwrap_or(depth);
    let fallback;
    let options = match config.options.as_ref() {
        Some(options) => options,
        None => {
            fallback = O::default();
            &fallback
        }
    };
    let mut walker = Walker {
        options,
        types: config.types.as_ref(),
        classes: config.classes.as_deref().unwrap_or(&[]),
        strict: params.is_strict(),
        include_undefined: params.includes_undefined(),
        parents: Vec::new(),
    };
    walker.run(lhs, rhs, max_depth)
}

struct Walker<'a, O> {
    options: &'a O,
    types: Option<&'a TypeOverrides<O>>,
    classes: &'a [ClassOverride<O>],
    strict: bool,
    include_undefined: bool,
    /// Left-hand structures on the current branch, one per open frame.
    parents: Vec<usize>,
}

/// Outcome of visiting one pair.
enum Step {
    Done(bool),
    Descend(Frame),
}

/// Children of a structured pair still waiting to be compared.
enum Frame {
    Sequence {
        lhs: Array,
        rhs: Array,
        next: usize,
        depth: usize,
    },
    Keyed {
        lhs: Object,
        rhs: Object,
        keys: std::vec::IntoIter<String>,
        depth: usize,
    },
}

impl Frame {
    fn depth(&self) -> usize {
        match self {
            Frame::Sequence { depth, .. } | Frame::Keyed { depth, .. } => *depth,
        }
    }

    fn next_pair(&mut self) -> Option<(Value, Value)> {
        match self {
            Frame::Sequence { lhs, rhs, next, .. } => {
                if *next >= lhs.len() {
                    return None;
                }
                let index = *next;
                *next += 1;
                Some((
                    lhs.get(index).unwrap_or_default(),
                    rhs.get(index).unwrap_or_default(),
                ))
            }
            Frame::Keyed { lhs, rhs, keys, .. } => {
                let key = keys.next()?;
                Some((
                    lhs.get(&key).unwrap_or_default(),
                    rhs.get(&key).unwrap_or_default(),
                ))
            }
        }
    }
}

impl<'a, O> Walker<'a, O> {
    /// Every structural level is a conjunction, so the first unequal pair
    /// anywhere decides the whole comparison.
    fn run(&mut self, lhs: &Value, rhs: &Value, depth: usize) -> bool {
        let mut stack = match self.visit(lhs, rhs, depth) {
            Step::Done(equal) => return equal,
            Step::Descend(frame) => vec![frame],
        };
        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth();
            let Some((l, r)) = frame.next_pair() else {
                stack.pop();
                self.parents.pop();
                continue;
            };
            if depth == 0 {
                if !l.strict_equals(&r) {
                    return false;
                }
                continue;
            }
            match self.visit(&l, &r, depth) {
                Step::Done(true) => {}
                Step::Done(false) => return false,
                Step::Descend(child) => stack.push(child),
            }
        }
        true
    }

    fn visit(&mut self, lhs: &Value, rhs: &Value, depth: usize) -> Step {
        let depth = depth.saturating_sub(1);
        if lhs.is_structured() {
            self.visit_structured(lhs, rhs, depth)
        } else {
            Step::Done(self.compare_primitive(lhs, rhs))
        }
    }

    fn type_override(&self, key: TypeKey) -> Option<&'a Compare<O>> {
        self.types.and_then(|types| types.get(key))
    }

    fn visit_structured(&mut self, lhs: &Value, rhs: &Value, depth: usize) -> Step {
        let classes = self.classes;
        for (index, class) in classes.iter().enumerate() {
            let verdict = class.check(lhs, rhs, self.options);
            if let Some(equal) = verdict.decided() {
                trace!(index, ?verdict, "class override decided");
                return Step::Done(equal);
            }
        }

        if depth == 0 && self.strict {
            return Step::Done(lhs.strict_equals(rhs));
        }

        if let Some(any) = self.type_override(TypeKey::Any) {
            trace!(tag = %lhs.type_tag(), "any override decided");
            return Step::Done(any.call(lhs, rhs, self.options));
        }
        let tag = lhs.type_tag();
        if tag != rhs.type_tag() {
            return Step::Done(false);
        }
        if let Some(compare) = self.type_override(tag.into()) {
            trace!(%tag, "type override decided");
            return Step::Done(compare.call(lhs, rhs, self.options));
        }

        let Some(address) = lhs.address() else {
            return Step::Done(false);
        };
        if self.parents.contains(&address) {
            trace!(%tag, "cycle guard hit");
            return Step::Done(true);
        }

        let frame = match (lhs, rhs) {
            // Sequences are always walked so element overrides see every item.
            (Value::Array(l), Value::Array(r)) => match self.sequence_frame(l, r, depth) {
                Some(frame) => frame,
                None => return Step::Done(false),
            },
            (Value::Object(l), Value::Object(r)) => {
                if l.ptr_eq(r) {
                    return Step::Done(true);
                }
                match self.keyed_frame(l, r, depth) {
                    Some(frame) => frame,
                    None => return Step::Done(false),
                }
            }
            _ => return Step::Done(false),
        };
        self.parents.push(address);
        Step::Descend(frame)
    }

    fn sequence_frame(&self, lhs: &Array, rhs: &Array, depth: usize) -> Option<Frame> {
        if lhs.len() != rhs.len() {
            return None;
        }
        Some(Frame::Sequence {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
            next: 0,
            depth,
        })
    }

    fn keyed_frame(&self, lhs: &Object, rhs: &Object, depth: usize) -> Option<Frame> {
        let include_undefined = self.include_undefined;
        let counted = |v: &Value| include_undefined || !v.is_undefined();
        let keys: Vec<String> = {
            let l = lhs.fields();
            let r = rhs.fields();
            if l.values().filter(|v| counted(*v)).count() != r.values().filter(|v| counted(*v)).count() {
                return None;
            }
            l.iter()
                .filter(|(_, v)| counted(*v))
                .map(|(key, _)| key.clone())
                .collect()
        };
        Some(Frame::Keyed {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
            keys: keys.into_iter(),
            depth,
        })
    }

    fn compare_primitive(&self, lhs: &Value, rhs: &Value) -> bool {
        let tag = lhs.type_tag();
        match self.type_override(tag.into()) {
            Some(compare) => compare.call(lhs, rhs, self.options),
            None => match self.type_override(TypeKey::Any) {
                Some(any) => any.call(lhs, rhs, self.options),
                None => lhs.strict_equals(rhs),
            },
        }
    }
}
