//! Edge case tests for loxi-par.

#[cfg(test)]
mod tests {
    use crate::test_util::{parse_expr_source, parse_source};
    use crate::*;

    #[test]
    fn test_edge_deeply_nested_grouping() {
        let source = format!("{}1{}", "(".repeat(64), ")".repeat(64));
        let (expr, handler) = parse_expr_source(&source);
        assert!(!handler.has_errors());
        assert!(expr.is_some());
    }

    #[test]
    fn test_edge_comma_in_grouping_vs_call() {
        // Grouped comma is the sequencing operator...
        let (expr, handler) = parse_expr_source("(1, 2)");
        assert!(!handler.has_errors());
        assert!(matches!(expr, Some(Expr::Grouping(_))));

        // ...but in an argument list it separates arguments.
        let (expr, _) = parse_expr_source("f(1, 2)");
        match expr.unwrap() {
            Expr::Call(call) => assert_eq!(call.args.len(), 2),
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_empty_class_body() {
        let (statements, handler) = parse_source("class Empty {}");
        assert!(!handler.has_errors());
        match &statements[0] {
            Stmt::Class(class) => {
                assert!(class.methods.is_empty());
                assert!(class.class_methods.is_empty());
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_getter_then_method() {
        let (statements, handler) = parse_source("class A { size { return 1; } m() {} }");
        assert!(!handler.has_errors());
        match &statements[0] {
            Stmt::Class(class) => {
                assert_eq!(class.methods.len(), 2);
                assert!(class.methods[0].is_getter);
                assert!(!class.methods[1].is_getter);
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_missing_left_operand_inside_larger_expression() {
        // Recovery placeholder participates in the surrounding tree.
        let (expr, handler) = parse_expr_source("(* 2) + 1");
        assert!(handler.has_errors());
        assert!(expr.is_some());
    }

    #[test]
    fn test_edge_unterminated_block_is_reported_once_per_parse() {
        let (_, handler) = parse_source("{ print 1;");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_lambda_as_call_argument() {
        let (expr, handler) = parse_expr_source("apply(fun (x) { return x; })");
        assert!(!handler.has_errors());
        match expr.unwrap() {
            Expr::Call(call) => assert!(matches!(call.args[0], Expr::Lambda(_))),
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_lambda_called_immediately() {
        let (expr, handler) = parse_expr_source("fun (x) { return x; }(1)");
        assert!(!handler.has_errors());
        match expr.unwrap() {
            Expr::Call(call) => assert!(matches!(*call.callee, Expr::Lambda(_))),
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_assignment_to_call_result_rejected() {
        let (_, handler) = parse_expr_source("f() = 1");
        assert!(handler.has_errors());
        let diags = handler.take_diagnostics();
        assert_eq!(diags[0].message, "Invalid assignment target.");
    }

    #[test]
    fn test_edge_this_and_super_parse_anywhere() {
        // Misuse of this/super is the resolver's concern; the parser
        // accepts them in any expression position.
        let (expr, handler) = parse_expr_source("this.x + super.y");
        assert!(!handler.has_errors());
        assert!(expr.is_some());
    }

    #[test]
    fn test_edge_for_with_expression_initializer() {
        let (statements, handler) = parse_source("i = 0; for (i = 1; i < 2;) print i;");
        assert!(!handler.has_errors());
        match &statements[1] {
            Stmt::Block(outer) => assert!(matches!(outer[0], Stmt::Expression(_))),
            other => panic!("expected Block, got {other:?}"),
        }
    }
}
