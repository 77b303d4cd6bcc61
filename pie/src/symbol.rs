use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;

static INTERNER: Lazy<RwLock<lasso::ThreadedRodeo>> =
    Lazy::new(|| RwLock::new(lasso::ThreadedRodeo::new()));

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

fn subscript_value(c: char) -> Option<u32> {
    SUBSCRIPT_DIGITS
        .iter()
        .position(|digit| *digit == c)
        .map(|position| position as u32)
}

fn subscript(mut number: u32) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(SUBSCRIPT_DIGITS[(number % 10) as usize]);
        number /= 10;
        if number == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Interned names.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(lasso::Spur);

impl Symbol {
    pub fn intern(sym: impl AsRef<str>) -> Self {
        Self(INTERNER.write().unwrap().get_or_intern(sym))
    }

    pub fn intern_static(sym: &'static str) -> Self {
        Self(INTERNER.write().unwrap().get_or_intern_static(sym))
    }

    pub fn resolve<'a>(&'a self) -> &'a str {
        let interner = INTERNER.read().unwrap();
        let symbol = interner.resolve(&self.0);

        // SAFETY: The lifetime is a bit of a lie: it is really tied to the lifetime of
        // `INTERNER`. But `INTERNER` is never dropped (since it is static), so it is
        // safe to truncate the lifetime to the shorter lifetime of `'a`.
        unsafe { std::mem::transmute::<&str, &'a str>(symbol) }
    }

    /// Return a variant of this name that is not used, according to
    /// `is_used`. Names are varied by appending (or incrementing) a subscript
    /// number, so that `x` becomes `x₁`, then `x₂`, and so on.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use pie::symbol::Symbol;
    ///
    /// let x = Symbol::intern("x");
    /// let x1 = Symbol::intern("x₁");
    ///
    /// assert_eq!(x.freshen(|_| false), x);
    /// assert_eq!(x.freshen(|name| name == x), x1);
    /// assert_eq!(x1.freshen(|name| name == x1), Symbol::intern("x₂"));
    /// ```
    pub fn freshen(self, mut is_used: impl FnMut(Symbol) -> bool) -> Symbol {
        if !is_used(self) {
            return self;
        }

        let name = self.resolve();
        let base = name.trim_end_matches(|c| subscript_value(c).is_some());
        let mut number = (name[base.len()..].chars())
            .filter_map(subscript_value)
            .fold(0u32, |acc, digit| acc.saturating_mul(10).saturating_add(digit));

        loop {
            number += 1;
            let candidate = Symbol::intern(format!("{base}{}", subscript(number)));
            if !is_used(candidate) {
                return candidate;
            }
        }
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.resolve()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        assert_eq!(Symbol::intern("add1"), Symbol::intern_static("add1"));
        assert_eq!(Symbol::intern("add1").resolve(), "add1");
    }

    #[test]
    fn freshen_skips_used_names() {
        let used = [Symbol::intern("n"), Symbol::intern("n₁"), Symbol::intern("n₂")];
        let fresh = Symbol::intern("n").freshen(|name| used.contains(&name));
        assert_eq!(fresh.resolve(), "n₃");
    }

    #[test]
    fn freshen_multi_digit_subscripts() {
        let name = Symbol::intern("k₉");
        assert_eq!(name.freshen(|n| n == name).resolve(), "k₁₀");
    }
}
