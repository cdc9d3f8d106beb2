//! Unit tests for SourcePosition.

use core_types::SourcePosition;

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_fields_round_trip() {
        let pos = SourcePosition {
            line: 10,
            column: 5,
            offset: 150,
        };
        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 150);
    }

    #[test]
    fn test_start_is_one_based() {
        let pos = SourcePosition::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_position_is_copy() {
        let pos = SourcePosition::start();
        let copied = pos;
        assert_eq!(pos, copied);
    }

    #[test]
    fn test_positions_compare_by_fields() {
        let a = SourcePosition {
            line: 2,
            column: 3,
            offset: 8,
        };
        let b = SourcePosition {
            line: 2,
            column: 3,
            offset: 8,
        };
        let c = SourcePosition {
            line: 2,
            column: 4,
            offset: 9,
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_names_the_fields() {
        let rendered = format!("{:?}", SourcePosition::start());
        assert!(rendered.contains("line"));
        assert!(rendered.contains("column"));
        assert!(rendered.contains("offset"));
    }
}
