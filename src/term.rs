// SPDX-License-Identifier: MPL-2.0

//! A term is the fundamental unit of operation of the PubGrub algorithm.
//! It is a positive or negative expression regarding a set of versions.

use std::fmt;

use crate::version_set::VersionSet;

/// A positive or negative expression regarding a set of versions.
///
/// A term is the core unit of information manipulated when solving: "positive" terms mean
/// "a version in this set is selected", and "negative" terms mean "no version in this set is
/// selected" (which is always true if the package is not part of the solution at all).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Term<VS: VersionSet> {
    /// For example, "1.0.0 <= v < 2.0.0" is a positive expression
    /// that is evaluated true if a version is selected
    /// and comprised between version 1.0.0 and version 2.0.0.
    Positive(VS),
    /// The term "not v < 3.0.0" is a negative expression
    /// that is evaluated true if a version is selected >= 3.0.0
    /// or if no version is selected at all.
    Negative(VS),
}

/// How a set of terms (usually the current partial solution) relates to another term.
///
/// This is the three-valued relation of §4.2: a term `self` is `Satisfied` by `other` when
/// `self` is a subset of `other` (the spec's SUBSET), `Contradicted` when the two are disjoint
/// (DISJOINT), and `Inconclusive` otherwise (OVERLAPPING).
#[derive(Eq, PartialEq, Debug)]
pub enum Relation {
    /// The term is satisfied (self is a subset of other).
    Satisfied,
    /// The term is contradicted (self is disjoint from other).
    Contradicted,
    /// The term is inconclusive (the two overlap, but neither contains the other).
    Inconclusive,
}

impl<VS: VersionSet> Term<VS> {
    /// A term that is always true.
    pub(crate) fn any() -> Self {
        Self::Negative(VS::empty())
    }

    /// A term that is never true.
    pub(crate) fn empty() -> Self {
        Self::Positive(VS::empty())
    }

    /// A positive term containing exactly that version.
    pub(crate) fn exact(version: VS::V) -> Self {
        Self::Positive(VS::singleton(version))
    }

    /// Simply check if a term is positive.
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Positive(_) => true,
            Self::Negative(_) => false,
        }
    }

    /// Negate a term.
    /// Evaluation of a negated term always returns
    /// the opposite of the evaluation of the original one.
    pub fn negate(&self) -> Self {
        match self {
            Self::Positive(set) => Self::Negative(set.clone()),
            Self::Negative(set) => Self::Positive(set.clone()),
        }
    }

    /// The [inverse](crate::term) of a term, per the spec's vocabulary: identical to [negate](Self::negate).
    pub fn inverse(&self) -> Self {
        self.negate()
    }

    /// Evaluate a term regarding a given version.
    pub fn contains(&self, v: &VS::V) -> bool {
        match self {
            Self::Positive(set) => set.contains(v),
            Self::Negative(set) => !set.contains(v),
        }
    }

    /// Unwrap the set contained in a positive term, panicking otherwise.
    pub(crate) fn unwrap_positive(&self) -> &VS {
        match self {
            Self::Positive(set) => set,
            _ => panic!("Negative term cannot unwrap positive set"),
        }
    }

    /// Unwrap the set contained in a negative term, panicking otherwise.
    #[allow(dead_code)]
    pub(crate) fn unwrap_negative(&self) -> &VS {
        match self {
            Self::Negative(set) => set,
            _ => panic!("Positive term cannot unwrap negative set"),
        }
    }

    /// Compute the relation between `self` and `other` per the truth table of §3/§4.2:
    ///
    /// |            | positive other | negative other |
    /// |------------|-----------------|-----------------|
    /// | positive self | subset/disjoint/overlap of ranges | self ∩ other empty ⇒ Satisfied, self ⊆ other ⇒ Contradicted, else Inconclusive |
    /// | negative self | never Satisfied; other ⊆ self ⇒ Contradicted, else Inconclusive | self ⊇ other ⇒ Satisfied (negating a smaller set is stronger), never Contradicted, else Inconclusive |
    pub fn relation_with(&self, other_term: &Term<VS>) -> Relation {
        match (self, other_term) {
            (Self::Positive(r1), Self::Positive(r2)) => {
                if !r1.allows_any(r2) {
                    Relation::Contradicted
                } else if r2.allows_all(r1) {
                    Relation::Satisfied
                } else {
                    Relation::Inconclusive
                }
            }
            (Self::Positive(r1), Self::Negative(r2)) => {
                if !r1.allows_any(r2) {
                    Relation::Satisfied
                } else if r2.allows_all(r1) {
                    Relation::Contradicted
                } else {
                    Relation::Inconclusive
                }
            }
            (Self::Negative(r1), Self::Positive(r2)) => {
                // Negating a term never yields Satisfied: a negative term can only rule out
                // versions, never fully account for a positive requirement.
                if r1.allows_all(r2) {
                    Relation::Contradicted
                } else {
                    Relation::Inconclusive
                }
            }
            (Self::Negative(r1), Self::Negative(r2)) => {
                if r1.allows_all(r2) {
                    Relation::Satisfied
                } else {
                    Relation::Inconclusive
                }
            }
        }
    }

    /// Returns the term representing the intersection of self and another term.
    /// Returns `None` if the intersection is empty (i.e. the conjunction of the two terms
    /// can never hold).
    pub(crate) fn intersection(&self, other: &Term<VS>) -> Option<Term<VS>> {
        match (self, other) {
            (Self::Positive(r1), Self::Positive(r2)) => {
                let set = r1.intersection(r2);
                (!set.is_empty()).then_some(Self::Positive(set))
            }
            (Self::Positive(r1), Self::Negative(r2)) | (Self::Negative(r2), Self::Positive(r1)) => {
                let set = r1.intersection(&r2.complement());
                (!set.is_empty()).then_some(Self::Positive(set))
            }
            (Self::Negative(r1), Self::Negative(r2)) => Some(Self::Negative(r1.union(r2))),
        }
    }

    /// Returns the term representing the difference of self and another term,
    /// defined as `self ∩ (not other)`.
    #[allow(dead_code)]
    pub(crate) fn difference(&self, other: &Term<VS>) -> Option<Term<VS>> {
        self.intersection(&other.negate())
    }

    /// Whether `self` and `other` can never simultaneously hold, i.e. their intersection is empty.
    pub(crate) fn is_disjoint(&self, other: &Term<VS>) -> bool {
        self.intersection(other).is_none()
    }

    /// Check if a term fully satisfies another term: `self` satisfies `other` iff
    /// `self.relation_with(other) == Relation::Satisfied`.
    pub fn satisfies(&self, other: &Term<VS>) -> bool {
        self.relation_with(other) == Relation::Satisfied
    }
}

impl<VS: VersionSet> fmt::Display for Term<VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(set) => write!(f, "{}", set),
            Self::Negative(set) => write!(f, "Not ( {} )", set),
        }
    }
}
