//! End-to-end tests: configuration files, SCF energies and the method
//! series runner with the default and custom registries.

use std::path::PathBuf;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use basis::System;
    use nalgebra::DMatrix;
    use scf::app::{build_atoms, build_basis};
    use scf::blocked::{Irrep, SPIN_ALPHA, SPIN_BETA, SPIN_RESTRICTED};
    use scf::config::{Config, ModuleOptions};
    use scf::property::dipole_moment;
    use scf::series::{run_series_of_methods, weighted_sum};
    use scf::{DerivReturn, EnergyMethod, ModuleContext, ModuleRegistry, ScfError, Wavefunction};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// Helper function to get the path to example files
    fn example_path(filename: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("example")
            .join(filename)
    }

    fn load(filename: &str) -> (Config, Wavefunction) {
        let text = std::fs::read_to_string(example_path(filename)).unwrap();
        let config: Config = serde_yml::from_str::<Config>(&text).unwrap().with_defaults();
        let atoms = build_atoms(&config).unwrap();
        let basis = build_basis(&config, &atoms).unwrap();
        let system = System::new(atoms)
            .with_charge(config.charge.unwrap_or(0) as f64)
            .with_multiplicity(config.multiplicity.unwrap_or(1))
            .with_basis_set("primary", basis);
        (config, Wavefunction::from_system(system))
    }

    fn context(config: &Config) -> ModuleContext {
        ModuleContext::new(
            Arc::new(ModuleRegistry::with_defaults()),
            config.module_options(),
        )
    }

    #[test]
    fn test_h2_scf_energy() {
        let (config, wfn) = load("h2.yaml");
        let ctx = context(&config);
        let result = ctx.method("SCF").unwrap().deriv(0, &wfn).unwrap();
        let energy = result.values[0];
        assert!((energy + 1.1167).abs() < 2e-4, "E(H2) = {}", energy);

        let eps = result
            .wavefunction
            .epsilon()
            .unwrap()
            .get(Irrep::A, SPIN_RESTRICTED)
            .unwrap();
        assert!((eps[0] + 0.578).abs() < 2e-3, "eps0 = {}", eps[0]);
        assert!((eps[1] - 0.670).abs() < 2e-3, "eps1 = {}", eps[1]);

        let mu = dipole_moment(&ctx, &result.wavefunction).unwrap();
        assert!(mu.norm() < 1e-8);
    }

    #[test]
    fn test_h_atom_uhf_energy() {
        let (config, wfn) = load("h_atom.yaml");
        let ctx = context(&config);
        let result = ctx.method("SCF").unwrap().deriv(0, &wfn).unwrap();
        assert!((result.values[0] + 0.46658).abs() < 1e-4, "E(H) = {}", result.values[0]);

        let opdm = result.wavefunction.opdm().unwrap();
        assert!(!opdm.is_restricted());
        assert_eq!(opdm.get(Irrep::A, SPIN_BETA).unwrap().amax(), 0.0);
        assert!(opdm.get(Irrep::A, SPIN_ALPHA).unwrap()[(0, 0)] > 0.0);
    }

    #[test]
    fn test_water_series() {
        let (config, wfn) = load("water.yaml");
        let ctx = context(&config);
        let keys: Vec<String> = config.methods.iter().map(|m| m.key.clone()).collect();
        let coefficients: Vec<f64> = config.methods.iter().map(|m| m.coefficient).collect();
        let results = run_series_of_methods(&ctx, &keys, &[wfn], &coefficients, 0, 2).unwrap();
        assert_eq!(results.len(), 2);

        let scf = results[0].values[0];
        let guess = results[1].values[0];
        assert!(scf > -75.1 && scf < -74.8, "E(H2O) = {}", scf);
        let total = weighted_sum(&results, &coefficients).unwrap();
        assert!((total[0] - (scf - guess)).abs() < 1e-12);
    }

    #[test]
    fn test_scf_without_diis_agrees() {
        let (config, wfn) = load("h2.yaml");
        let with_diis = context(&config);
        let without = with_diis.with_options(ModuleOptions {
            diis_subspace_size: 0,
            ..config.module_options()
        });
        let e1 = with_diis.method("SCF").unwrap().energy(&wfn).unwrap();
        let e2 = without.method("SCF").unwrap().energy(&wfn).unwrap();
        assert!((e1 - e2).abs() < 1e-8);
    }

    /// Returns a fixed energy after an optional delay, or fails.
    struct Fixed {
        energy: f64,
        delay_ms: u64,
        fail: bool,
    }

    impl EnergyMethod for Fixed {
        fn deriv(&mut self, order: usize, wfn: &Wavefunction) -> scf::Result<DerivReturn> {
            thread::sleep(Duration::from_millis(self.delay_ms));
            if self.fail {
                return Err(ScfError::InvalidState("asked to fail".to_string()));
            }
            let n = 3 * wfn.system().map_or(0, |s| s.n_atoms());
            let values = if order == 0 {
                vec![self.energy]
            } else {
                vec![self.energy; n.pow(order as u32)]
            };
            Ok(DerivReturn {
                wavefunction: wfn.clone(),
                values,
            })
        }
    }

    fn mock_context() -> ModuleContext {
        let mut registry = ModuleRegistry::with_defaults();
        for (key, energy, delay_ms, fail) in [
            ("Slow", 1.0, 60, false),
            ("Fast", 2.0, 0, false),
            ("Medium", 3.0, 20, false),
            ("Broken", 0.0, 0, true),
        ] {
            registry.register_method(key, move |_| {
                Box::new(Fixed {
                    energy,
                    delay_ms,
                    fail,
                })
            });
        }
        ModuleContext::new(Arc::new(registry), ModuleOptions::default())
    }

    #[test]
    fn test_series_keeps_submission_order() {
        let ctx = mock_context();
        let keys: Vec<String> = ["Slow", "Fast", "Medium"].iter().map(|k| k.to_string()).collect();
        let results =
            run_series_of_methods(&ctx, &keys, &[Wavefunction::new()], &[1.0, 1.0, 1.0], 0, 3)
                .unwrap();
        let energies: Vec<f64> = results.iter().map(|r| r.values[0]).collect();
        assert_eq!(energies, vec![1.0, 2.0, 3.0]);
        assert_eq!(weighted_sum(&results, &[1.0, -1.0, 0.5]).unwrap(), vec![0.5]);
    }

    #[test]
    fn test_series_over_systems() {
        let ctx = mock_context();
        let (_, h2) = load("h2.yaml");
        let (_, h) = load("h_atom.yaml");
        let results = run_series_of_methods(
            &ctx,
            &["Fast".to_string()],
            &[h2, h],
            &[1.0, -2.0],
            1,
            2,
        )
        .unwrap();
        assert_eq!(results[0].values.len(), 6);
        assert_eq!(results[1].values.len(), 3);
    }

    #[test]
    fn test_series_fails_fast() {
        let ctx = mock_context();
        let keys: Vec<String> = ["Slow", "Broken", "Fast"].iter().map(|k| k.to_string()).collect();
        let result = run_series_of_methods(&ctx, &keys, &[Wavefunction::new()], &[1.0; 3], 0, 2);
        assert!(matches!(result, Err(ScfError::InvalidState(_))));

        let unknown = run_series_of_methods(
            &ctx,
            &["MP2".to_string()],
            &[Wavefunction::new()],
            &[1.0],
            0,
            1,
        );
        assert!(matches!(unknown, Err(ScfError::UnknownModule { .. })));
    }

    #[test]
    fn test_core_guess_density_is_idempotent() {
        let (config, wfn) = load("water.yaml");
        let ctx = context(&config);
        let result = ctx.method("CoreGuess").unwrap().deriv(0, &wfn).unwrap();
        let system = result.wavefunction.system().unwrap();
        let s = scf::fill::ao_one_electron(&ctx, "OSOverlap", system).unwrap();
        let d = result
            .wavefunction
            .opdm()
            .unwrap()
            .get(Irrep::A, SPIN_RESTRICTED)
            .unwrap()
            .clone();
        // D S D = 2 D for a closed shell density with occupation 2
        let dsd: DMatrix<f64> = &d * &s * &d;
        assert!((dsd - &d * 2.0).abs().max() < 1e-8);
        assert!(((&d * &s).trace() - 10.0).abs() < 1e-8);
    }
}
