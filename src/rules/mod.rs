//! The rewrite rule catalog: one module per family, registered in the fixed
//! order the driver scans in.

mod arithmetic;
mod comparisons;
mod control_flow;
mod dead_store;
mod factoring;
mod stack_cleanup;
mod strings;

use crate::driver::RuleRegistry;

/// Build the catalog in registration order. This order is load-bearing: it's
/// the only source of determinism when more than one rule could fire at the
/// same position, and reordering it changes the fixed point a method body
/// converges to.
pub fn default_catalog() -> RuleRegistry {
    let mut r = RuleRegistry::new();
    r.register_rule("constant_fold", arithmetic::constant_fold)
        .register_rule("goto_return", control_flow::goto_return)
        .register_rule("invert_comparison", control_flow::invert_comparison)
        .register_rule("simplify_dup_xxx_pop", stack_cleanup::simplify_dup_xxx_pop)
        .register_rule("simplify_member_store", stack_cleanup::simplify_member_store)
        .register_rule("simplify_astore_aload", stack_cleanup::simplify_astore_aload)
        .register_rule("simplify_istore_iload", stack_cleanup::simplify_istore_iload)
        .register_rule(
            "simplify_multiplication_right",
            arithmetic::simplify_multiplication_right,
        )
        .register_rule("positive_increment", arithmetic::positive_increment)
        .register_rule(
            "simplify_iconst_0_goto_ifeq",
            control_flow::simplify_iconst_0_goto_ifeq,
        )
        .register_rule("simplify_goto_goto", control_flow::simplify_goto_goto)
        .register_rule("remove_iconst_ifeq", comparisons::remove_iconst_ifeq)
        .register_rule("remove_dead_label", control_flow::remove_dead_label)
        .register_rule("fuse_labels", control_flow::fuse_labels)
        .register_rule(
            "remove_instruction_after_goto",
            control_flow::remove_instruction_after_goto,
        )
        .register_rule(
            "remove_instruction_after_return",
            control_flow::remove_instruction_after_return,
        )
        .register_rule("simplify_icmp_0", comparisons::simplify_icmp_0)
        .register_rule("simplify_acmp_null", comparisons::simplify_acmp_null)
        .register_rule("basic_unswap", stack_cleanup::basic_unswap)
        .register_rule("dup_pop", stack_cleanup::dup_pop)
        .register_rule(
            "simplify_ldc_string_ifnonnull",
            strings::simplify_ldc_string_ifnonnull,
        )
        .register_rule("remove_unnecessary_goto", control_flow::remove_unnecessary_goto)
        .register_rule(
            "simplify_concat_string_ifnonnull",
            strings::simplify_concat_string_ifnonnull,
        )
        .register_rule("remove_dead_store", dead_store::remove_dead_store)
        .register_rule("basic_expression_pop", stack_cleanup::basic_expression_pop)
        .register_rule("simplify_dup_ifeq_ifeq", control_flow::simplify_dup_ifeq_ifeq)
        .register_rule("simplify_dup_ifeq_ifne", control_flow::simplify_dup_ifeq_ifne)
        .register_rule(
            "simplify_iconst_goto_ifeq",
            control_flow::simplify_iconst_goto_ifeq,
        )
        .register_rule(
            "simplify_iconst_0_goto_dup_ifeq",
            control_flow::simplify_iconst_0_goto_dup_ifeq,
        )
        .register_rule(
            "simplify_iconst_1_dup_ifeq_pop",
            control_flow::simplify_iconst_1_dup_ifeq_pop,
        )
        .register_rule("negative_increment", arithmetic::negative_increment)
        .register_rule("simplify_aload_astore", stack_cleanup::simplify_aload_astore)
        .register_rule("simplify_iload_istore", stack_cleanup::simplify_iload_istore)
        .register_rule("factor_instruction", factoring::factor_instruction)
        .register_rule("factor_instruction2", factoring::factor_instruction2)
        .register_rule("factor_instruction_risky", factoring::factor_instruction_risky)
        .register_rule("factor_instruction2_risky", factoring::factor_instruction2_risky)
        .register_rule("remove_nop", control_flow::remove_nop);
    r
}
