//! Property-based tests for parsing and version ordering.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use feature_gates::core::gate::{FeatureGate, VersionedSpec};
use feature_gates::core::types::{PreRelease, ReleaseVersion};
use feature_gates::gates::parse_str;

/// Strategy for generating a lifecycle stage.
fn pre_release() -> impl Strategy<Value = PreRelease> {
    prop::sample::select(PreRelease::ALL.to_vec())
}

/// Strategy for generating `MAJOR.MINOR` or `MAJOR.MINOR.PATCH` strings.
fn version_string() -> impl Strategy<Value = String> {
    (0u64..5, 0u64..40, prop::option::of(0u64..10)).prop_map(|(major, minor, patch)| match patch {
        Some(patch) => format!("{major}.{minor}.{patch}"),
        None => format!("{major}.{minor}"),
    })
}

/// Strategy for a well-formed spec as (version, stage, default, locked).
fn spec_fields() -> impl Strategy<Value = (String, PreRelease, bool, bool)> {
    (version_string(), pre_release(), any::<bool>(), any::<bool>())
}

/// Strategy for a list of gates with unique names.
fn gate_list() -> impl Strategy<Value = Vec<(String, Vec<(String, PreRelease, bool, bool)>)>> {
    prop::collection::btree_map(
        "[A-Z][A-Za-z0-9]{0,20}",
        prop::collection::vec(spec_fields(), 0..6),
        0..8,
    )
    .prop_map(|map| map.into_iter().collect())
}

fn render(gates: &[(String, Vec<(String, PreRelease, bool, bool)>)]) -> String {
    let mut doc = String::new();
    for (name, specs) in gates {
        doc.push_str(&format!("- name: \"{name}\"\n  versionedSpecs:"));
        if specs.is_empty() {
            doc.push_str(" []\n");
            continue;
        }
        doc.push('\n');
        for (version, stage, default, locked) in specs {
            doc.push_str(&format!(
                "    - default: {default}\n      lockToDefault: {locked}\n      preRelease: {stage}\n      version: \"{version}\"\n"
            ));
        }
    }
    doc
}

proptest! {
    /// Parsing arbitrary text never panics.
    #[test]
    fn parse_is_total(input in "\\PC{0,200}") {
        let _ = parse_str(&input);
    }

    /// Well-formed documents come back in document order with every field intact.
    #[test]
    fn well_formed_documents_round_trip(gates in gate_list()) {
        let parsed = parse_str(&render(&gates)).expect("well-formed document");

        prop_assert_eq!(parsed.gates.len(), gates.len());
        for (gate, (name, specs)) in parsed.gates.iter().zip(&gates) {
            prop_assert_eq!(gate.name(), name.as_str());
            prop_assert_eq!(gate.versioned_specs().len(), specs.len());
            for (spec, (version, stage, default, locked)) in gate.versioned_specs().iter().zip(specs) {
                prop_assert_eq!(spec.version(), version.as_str());
                prop_assert_eq!(spec.pre_release(), *stage);
                prop_assert_eq!(spec.default(), *default);
                prop_assert_eq!(spec.lock_to_default(), *locked);
            }
        }
    }

    /// A locked spec ignores every requested value.
    #[test]
    fn locked_spec_always_yields_default(
        (version, stage, default, _) in spec_fields(),
        requested in prop::option::of(any::<bool>()),
    ) {
        let spec = VersionedSpec::new(version, stage, default, true);
        prop_assert_eq!(spec.effective_value(requested), default);
    }

    /// Version ordering agrees with numeric (major, minor, patch) ordering.
    #[test]
    fn version_order_is_numeric(a in version_string(), b in version_string()) {
        let key = |s: &str| -> (u64, u64, u64) {
            let mut parts = s.split('.').map(|p| p.parse::<u64>().unwrap());
            (parts.next().unwrap(), parts.next().unwrap(), parts.next().unwrap_or(0))
        };
        let va = ReleaseVersion::parse(&a).unwrap();
        let vb = ReleaseVersion::parse(&b).unwrap();
        prop_assert_eq!(va.cmp(&vb), key(&a).cmp(&key(&b)));
    }

    /// Chronological order is sorted and is a permutation of document order.
    #[test]
    fn chronological_specs_are_sorted(specs in prop::collection::vec(spec_fields(), 0..10)) {
        let gate = FeatureGate::new(
            "Foo",
            specs
                .into_iter()
                .map(|(v, s, d, l)| VersionedSpec::new(v, s, d, l))
                .collect(),
        )
        .unwrap();

        let ordered = gate.chronological_specs();
        prop_assert_eq!(ordered.len(), gate.versioned_specs().len());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].release_version().unwrap() <= pair[1].release_version().unwrap());
        }
    }

    /// `spec_at` never returns a spec released after the requested version.
    #[test]
    fn spec_at_never_looks_ahead(
        specs in prop::collection::vec(spec_fields(), 1..10),
        at in version_string(),
    ) {
        let gate = FeatureGate::new(
            "Foo",
            specs
                .into_iter()
                .map(|(v, s, d, l)| VersionedSpec::new(v, s, d, l))
                .collect(),
        )
        .unwrap();
        let at = ReleaseVersion::parse(&at).unwrap();

        match gate.spec_at(&at) {
            Some(spec) => prop_assert!(spec.release_version().unwrap() <= at),
            None => prop_assert!(gate
                .versioned_specs()
                .iter()
                .all(|s| s.release_version().unwrap() > at)),
        }
    }
}
