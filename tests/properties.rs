//! Property tests for the quantified invariants of spec.md §8, run over
//! randomly generated but well-formed instruction streams.

use proptest::prelude::*;

use bytecode_peephole::ir::{stack_effect, EffectClass, InstData, Label, Stream};
use bytecode_peephole::{optimize, OptimizerConfig};

/// One of a handful of side-effect-free, fixed-arity instructions safe to
/// place anywhere in a generated body without needing real stack-type
/// tracking; this crate's invariants (label bookkeeping, idempotence,
/// monotonic size, well-formedness) don't depend on the body being a stack
/// machine that would actually verify.
fn simple_op() -> impl Strategy<Value = InstData> {
    prop_oneof![
        (0i32..4).prop_map(InstData::PushInt),
        (0u16..3).prop_map(InstData::LoadInt),
        (0u16..3).prop_map(InstData::StoreInt),
        (0u16..3).prop_map(InstData::LoadRef),
        (0u16..3).prop_map(InstData::StoreRef),
        Just(InstData::Add),
        Just(InstData::Sub),
        Just(InstData::Mul),
        Just(InstData::Dup),
        Just(InstData::Pop),
        Just(InstData::Swap),
        Just(InstData::Nop),
    ]
}

/// A well-formed body: a run of simple ops, optionally with one label used by
/// a `goto` earlier in the stream and defined later, always terminated by a
/// `return` so `remove_instruction_after_goto`/`_return` have a definite
/// answer at the tail.
fn body_strategy() -> impl Strategy<Value = Vec<InstData>> {
    let l = Label::from_u32(0);
    (
        prop::collection::vec(simple_op(), 0..6),
        prop::collection::vec(simple_op(), 0..6),
        any::<bool>(),
    )
        .prop_map(move |(before, after, with_goto)| {
            let mut v = Vec::new();
            if with_goto {
                v.push(InstData::Goto(l));
            }
            v.extend(before);
            if with_goto {
                v.push(InstData::LabelMark(l));
            }
            v.extend(after);
            v.push(InstData::ReturnVoid);
            v
        })
}

/// The size/load-count/multiplication-count prefix of spec.md §8 invariant
/// 3's lexicographic tuple, computed over the live instructions of `stream`.
///
/// The full six-component tuple also tracks jumps landing on a jump or
/// `dup;ifzero` sequence, label count, and non-lowest-label-jump count. Label
/// count specifically is *not* monotonic component-by-component: a few rules
/// (the fresh-label control-flow and factoring rules) trade one fewer jump
/// landing on a jump/`dup;ifzero` for one more label, which is a net
/// improvement on the real tuple but would look like a regression if label
/// count were checked in isolation. The three components here are each
/// independently non-increasing under every rule in the catalog — no rule
/// ever introduces a `load_int`/`load_ref`/`mul` that wasn't already present
/// — so they're safe to check directly without reconstructing the full,
/// jump-topology-dependent metric.
fn size_load_mul(stream: &Stream) -> (usize, usize, usize) {
    let mut size = 0;
    let mut loads = 0;
    let mut muls = 0;
    for (_, inst) in stream.iter() {
        size += 1;
        match inst {
            InstData::LoadInt(_) | InstData::LoadRef(_) => loads += 1,
            InstData::Mul => muls += 1,
            _ => {}
        }
    }
    (size, loads, muls)
}

/// Every live label identifier has a single defining node, and that node is
/// reachable by walking `next` from the head.
fn check_well_formed(stream: &Stream) {
    use std::collections::HashSet;
    let positions: HashSet<_> = stream.iter().map(|(pos, _)| pos).collect();

    let mut seen_labels: HashSet<_> = HashSet::new();
    for (_, inst) in stream.iter() {
        if let Some(l) = inst.label_target() {
            let dest = stream.labels().destination(l).expect("label target must resolve");
            assert!(positions.contains(&dest), "label destination must be reachable from the head");
        }
        if let InstData::LabelMark(l) = inst {
            assert!(seen_labels.insert(*l), "label {l:?} defined more than once");
        }
    }
}

/// For every `(label, refcount)` the table reports, recount it by scanning
/// the live stream and compare (spec.md §8 invariant 1).
fn check_label_refcounts_exact(stream: &Stream) {
    use std::collections::HashMap;
    let mut counted: HashMap<Label, u32> = HashMap::new();
    for (_, inst) in stream.iter() {
        if let Some(l) = inst.label_target() {
            *counted.entry(l).or_insert(0) += 1;
        }
    }
    for (l, count) in &counted {
        assert_eq!(
            stream.labels().refcount(*l),
            *count,
            "refcount for {l:?} must equal the exact number of targeting instructions"
        );
    }
}

proptest! {
    #[test]
    fn optimize_preserves_label_refcounts(body in body_strategy()) {
        let mut stream = Stream::from_instructions(body);
        optimize(&mut stream, &OptimizerConfig::default()).unwrap();
        check_label_refcounts_exact(&stream);
    }

    #[test]
    fn optimize_is_idempotent(body in body_strategy()) {
        let mut stream = Stream::from_instructions(body);
        let report1 = optimize(&mut stream, &OptimizerConfig::default()).unwrap();
        let after_first: Vec<InstData> = stream.iter().map(|(_, d)| d.clone()).collect();
        let report2 = optimize(&mut stream, &OptimizerConfig::default()).unwrap();
        let after_second: Vec<InstData> = stream.iter().map(|(_, d)| d.clone()).collect();
        prop_assert_eq!(after_first, after_second);
        prop_assert_eq!(report2.sweeps, 1);
        let _ = report1;
    }

    #[test]
    fn optimize_never_increases_size_loads_or_muls(body in body_strategy()) {
        let mut stream = Stream::from_instructions(body);
        let before = size_load_mul(&stream);
        optimize(&mut stream, &OptimizerConfig::default()).unwrap();
        let after = size_load_mul(&stream);
        prop_assert!(after.0 <= before.0, "bytecode size must not grow");
        prop_assert!(after.1 <= before.1, "load count must not grow");
        prop_assert!(after.2 <= before.2, "multiplication count must not grow");
    }

    #[test]
    fn optimize_keeps_the_stream_well_formed(body in body_strategy()) {
        let mut stream = Stream::from_instructions(body);
        optimize(&mut stream, &OptimizerConfig::default()).unwrap();
        check_well_formed(&stream);
    }

    #[test]
    fn dup_xxx_pop_never_fires_on_a_two_operand_consumer(body in prop::collection::vec(simple_op(), 1..4)) {
        // `dup; X; pop` only fires when X consumes exactly one value and
        // leaves the stack one shorter; `Add`/`Sub`/`Mul` consume two and so
        // must never be rewritten by this rule even though they share the
        // `-1` net delta with the single-operand instructions that do qualify.
        for inst in [InstData::Add, InstData::Sub, InstData::Mul] {
            let effect = stack_effect(&inst);
            prop_assert_eq!(effect.class, EffectClass::Normal);
            prop_assert_eq!(effect.delta, -1);
            prop_assert_eq!(effect.used, 2);
        }
        let _ = body;
    }
}
