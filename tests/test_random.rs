//! Integration tests for rand() and randf()

#[path = "common/mod.rs"]
mod common;
#[allow(unused_imports)]
use common::{eval, ints, seeded, Branch, Config, Evaluator, Value};

use cmdblock::{rand_unique, randf_unique};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_rand_unique_sorted_in_range() {
    for seed in 0..20 {
        let seq = rand_unique(&mut rng(seed), -5, 5, 6).unwrap();
        assert_eq!(seq.len(), 6);
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
        assert!(seq.iter().all(|n| (-5..=5).contains(n)));
    }
}

#[test]
fn test_rand_whole_population() {
    assert_eq!(rand_unique(&mut rng(3), 7, 9, 3).unwrap(), vec![7, 8, 9]);
}

#[test]
fn test_rand_zero_count() {
    assert!(rand_unique(&mut rng(3), 1, 10, 0).unwrap().is_empty());
}

#[test]
fn test_rand_extreme_range() {
    let seq = rand_unique(&mut rng(11), i64::MIN, i64::MAX, 3);
    // The full i64 range does not fit a 64-bit index
    if let Ok(seq) = seq {
        assert_eq!(seq.len(), 3);
    }
    let seq = rand_unique(&mut rng(11), i64::MAX - 2, i64::MAX, 3).unwrap();
    assert_eq!(seq, vec![i64::MAX - 2, i64::MAX - 1, i64::MAX]);
}

#[test]
fn test_rand_infeasible() {
    let err = rand_unique(&mut rng(1), 1, 5, 6).unwrap_err();
    assert_eq!(err.to_string(), "Count too large for unique integers in range");
    let err = rand_unique(&mut rng(1), 5, 1, 1).unwrap_err();
    assert_eq!(err.to_string(), "Count too large for unique integers in range");
}

#[test]
fn test_rand_negative_count() {
    let err = rand_unique(&mut rng(1), 1, 5, -1).unwrap_err();
    assert_eq!(err.to_string(), "Sample larger than population or is negative");
}

#[test]
fn test_randf_rounding_and_order() {
    for seed in 0..20 {
        let seq = randf_unique(&mut rng(seed), 0.0, 1.0, 5, 2, 10_000).unwrap();
        assert_eq!(seq.len(), 5);
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
        for x in seq {
            assert!((0.0..=1.0).contains(&x));
            assert_eq!((x * 100.0).round() / 100.0, x);
        }
    }
}

#[test]
fn test_randf_exhausts_small_range() {
    // 0.0, 0.1 and 0.2 are the only values at one decimal
    let seq = randf_unique(&mut rng(5), 0.0, 0.2, 3, 1, 1_000_000).unwrap();
    assert_eq!(seq.len(), 3);
}

#[test]
fn test_randf_negative_precision() {
    let seq = randf_unique(&mut rng(2), 0.0, 1000.0, 4, -2, 10_000).unwrap();
    assert_eq!(seq.len(), 4);
    for x in seq {
        assert_eq!(x % 100.0, 0.0);
    }
}

#[test]
fn test_randf_infeasible() {
    let err = randf_unique(&mut rng(1), 0.0, 1.0, 12, 1, 10_000).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to generate 12 unique values with precision 1 over the range 0.0-1.0"
    );
}

#[test]
fn test_randf_attempt_cap() {
    let err = randf_unique(&mut rng(1), 0.0, 1000.0, 500, 0, 10).unwrap_err();
    assert!(err.to_string().contains("after 10 draws"));
}

#[test]
fn test_randf_infinite_bound() {
    let err = randf_unique(&mut rng(1), 0.0, f64::INFINITY, 1, 2, 10).unwrap_err();
    assert_eq!(err.to_string(), "cannot convert float infinity to integer");
}

#[test]
fn test_dispatch_rand() {
    let out = eval("rand(1, 3, 3)");
    assert_eq!(out.branch, Branch::RandomInt);
    assert_eq!(out.list, Some(ints(&[1, 2, 3])));
}

#[test]
fn test_dispatch_rand_bad_literal() {
    let out = eval("rand(1.5, 3, 1)");
    assert_eq!(
        out.string.as_deref(),
        Some("Random error: invalid literal for int(): '1.5'")
    );
}

#[test]
fn test_dispatch_randf_outputs_doubles() {
    let out = eval("randf(10, 20, 3)");
    assert_eq!(out.branch, Branch::RandomFloat);
    let list = out.list.unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|v| matches!(v, Value::Double(_))));
}

#[test]
fn test_default_precision_from_config() {
    let mut eval = Evaluator::with_config(Config {
        seed: Some(4),
        default_precision: 0,
        ..Config::default()
    });
    let list = eval.run("randf(0, 100, 5)").list.unwrap();
    for v in list {
        let x = v.as_f64().unwrap();
        assert_eq!(x.fract(), 0.0);
    }
}

#[test]
fn test_seed_repeats() {
    let a = seeded(99).run("randf(0, 1, 4, 3)");
    let b = seeded(99).run("randf(0, 1, 4, 3)");
    assert_eq!(a.list, b.list);
}
