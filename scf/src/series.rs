//! Running several methods as one weighted calculation.
//!
//! A composite energy is a linear combination sum_i c_i E_i, where each term
//! is one method applied to one system. [`run_series_of_methods`] evaluates
//! the terms in parallel and [`weighted_sum`] or [`accumulate_derivative`]
//! combine them.

use crate::error::{Result, ScfError};
use crate::method::DerivReturn;
use crate::registry::ModuleContext;
use crate::wavefunction::Wavefunction;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

/// Evaluates one task per coefficient on a pool of `n_threads` workers
/// (0: one per core). Either the methods or the systems may vary between
/// tasks; a single key or wavefunction is shared by all of them. Results
/// are returned in task order and the first failure aborts the batch.
pub fn run_series_of_methods(
    ctx: &ModuleContext,
    keys: &[String],
    wfns: &[Wavefunction],
    coefficients: &[f64],
    deriv: usize,
    n_threads: usize,
) -> Result<Vec<DerivReturn>> {
    let n_tasks = coefficients.len();
    let same_method = keys.len() == 1;
    let same_system = wfns.len() == 1;
    let both_vary = !same_method && !same_system;

    if keys.is_empty() || wfns.is_empty() {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "need at least one method and one system, got {} and {}",
            keys.len(),
            wfns.len()
        )));
    }
    if same_method && same_system && n_tasks != 1 {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "either the number of systems ({}) or of methods ({}) must equal \
             the number of coefficients ({})",
            wfns.len(),
            keys.len(),
            n_tasks
        )));
    }
    if (both_vary || same_method) && wfns.len() != n_tasks {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "{} systems for {} coefficients",
            wfns.len(),
            n_tasks
        )));
    }
    if (both_vary || same_system) && keys.len() != n_tasks {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "{} methods for {} coefficients",
            keys.len(),
            n_tasks
        )));
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
        .map_err(|e| ScfError::ThreadPool(e.to_string()))?;
    info!(
        "Running {} task(s) on {} thread(s)",
        n_tasks,
        pool.current_num_threads()
    );

    pool.install(|| {
        (0..n_tasks)
            .into_par_iter()
            .map(|i| {
                let key = if same_method { &keys[0] } else { &keys[i] };
                let wfn = if same_system { &wfns[0] } else { &wfns[i] };
                debug!("Task {}: method '{}'", i, key);
                ctx.method(key)?.deriv(deriv, wfn)
            })
            .collect::<Result<Vec<_>>>()
    })
}

/// Sum of the results' values weighted by `coefficients`.
pub fn weighted_sum(results: &[DerivReturn], coefficients: &[f64]) -> Result<Vec<f64>> {
    if results.len() != coefficients.len() {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "{} results for {} coefficients",
            results.len(),
            coefficients.len()
        )));
    }
    let Some(first) = results.first() else {
        return Ok(Vec::new());
    };
    let mut total = vec![0.0; first.values.len()];
    for (result, c) in results.iter().zip(coefficients) {
        if result.values.len() != total.len() {
            return Err(ScfError::StructureMismatch(format!(
                "results of length {} and {} cannot be added",
                total.len(),
                result.values.len()
            )));
        }
        for (t, v) in total.iter_mut().zip(&result.values) {
            *t += c * v;
        }
    }
    Ok(total)
}

/// Adds `coeff` times the derivative tensor of a subsystem into that of the
/// supersystem. Both tensors are flattened row-major with `order` indices,
/// each running over 3 * n_atoms (atom, component) pairs. `atom_map[i]` is
/// the supersystem index of subsystem atom `i`.
pub fn accumulate_derivative(
    result: &mut [f64],
    sub_result: &[f64],
    coeff: f64,
    atom_map: &[usize],
    n_super: usize,
    order: usize,
) -> Result<()> {
    let n_sub = atom_map.len();
    let (dim_super, dim_sub) = (3 * n_super, 3 * n_sub);
    let order_u32 = u32::try_from(order)
        .map_err(|_| ScfError::NotImplemented(format!("derivative of order {}", order)))?;
    let expected_super = dim_super.pow(order_u32);
    let expected_sub = dim_sub.pow(order_u32);
    if result.len() != expected_super || sub_result.len() != expected_sub {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "order {} tensors need {} and {} values, got {} and {}",
            order,
            expected_super,
            expected_sub,
            result.len(),
            sub_result.len()
        )));
    }
    if let Some(&bad) = atom_map.iter().find(|&&a| a >= n_super) {
        return Err(ScfError::ArgumentCountMismatch(format!(
            "atom index {} outside a system of {} atoms",
            bad, n_super
        )));
    }
    if order == 0 {
        result[0] += coeff * sub_result[0];
        return Ok(());
    }
    if n_sub == 0 {
        return Ok(());
    }

    // odometer over the sub tensor indices, last digit fastest
    let mut digits = vec![0usize; order];
    for value in sub_result {
        let super_offset = digits.iter().fold(0, |offset, &d| {
            offset * dim_super + atom_map[d / 3] * 3 + d % 3
        });
        result[super_offset] += coeff * value;

        for pos in (0..order).rev() {
            digits[pos] += 1;
            if digits[pos] < dim_sub {
                break;
            }
            digits[pos] = 0;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(value: f64) -> DerivReturn {
        DerivReturn::energy(Wavefunction::new(), value)
    }

    #[test]
    fn test_argument_counts() {
        let ctx = ModuleContext::default();
        let one_key = vec!["SCF".to_string()];
        let two_keys = vec!["SCF".to_string(), "CoreGuess".to_string()];
        let one_wfn = vec![Wavefunction::new()];
        let two_wfns = vec![Wavefunction::new(), Wavefunction::new()];

        let mismatch = |r: Result<Vec<DerivReturn>>| matches!(r, Err(ScfError::ArgumentCountMismatch(_)));
        assert!(mismatch(run_series_of_methods(&ctx, &one_key, &one_wfn, &[1.0, 1.0], 0, 1)));
        assert!(mismatch(run_series_of_methods(&ctx, &one_key, &two_wfns, &[1.0], 0, 1)));
        assert!(mismatch(run_series_of_methods(&ctx, &two_keys, &one_wfn, &[1.0, 2.0, 3.0], 0, 1)));
        assert!(mismatch(run_series_of_methods(&ctx, &two_keys, &two_wfns, &[1.0], 0, 1)));
        assert!(mismatch(run_series_of_methods(&ctx, &[], &one_wfn, &[1.0], 0, 1)));
    }

    #[test]
    fn test_weighted_sum() {
        let results = vec![energy(2.0), energy(-1.0), energy(0.5)];
        let total = weighted_sum(&results, &[1.0, 2.0, -4.0]).unwrap();
        assert_eq!(total, vec![-2.0]);
        assert!(weighted_sum(&results, &[1.0]).is_err());
        assert!(weighted_sum(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_accumulate_energy() {
        let mut result = vec![1.0];
        accumulate_derivative(&mut result, &[3.0], -2.0, &[0], 2, 0).unwrap();
        assert_eq!(result, vec![-5.0]);
    }

    #[test]
    fn test_accumulate_gradient() {
        // subsystem atoms 0 and 1 are supersystem atoms 2 and 0
        let mut result = vec![0.0; 9];
        let sub = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        accumulate_derivative(&mut result, &sub, 0.5, &[2, 0], 3, 1).unwrap();
        assert_eq!(result, vec![2.0, 2.5, 3.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_accumulate_hessian() {
        let n_super = 2;
        let dim = 3 * n_super;
        let mut result = vec![0.0; dim * dim];
        let sub: Vec<f64> = (0..9).map(|v| v as f64).collect();
        accumulate_derivative(&mut result, &sub, 1.0, &[1], n_super, 2).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(result[(3 + i) * dim + 3 + j], (i * 3 + j) as f64);
            }
        }
        let untouched: f64 = (0..3).flat_map(|i| (0..dim).map(move |j| i * dim + j)).map(|k| result[k]).sum();
        assert_eq!(untouched, 0.0);

        assert!(accumulate_derivative(&mut result, &sub[..8], 1.0, &[1], n_super, 2).is_err());
        assert!(accumulate_derivative(&mut result, &sub, 1.0, &[2], n_super, 2).is_err());
    }
}
