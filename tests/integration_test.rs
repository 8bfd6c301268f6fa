//! End-to-end tests running the example YAML inputs through the library
//!
//! H2 in a minimal basis has a single pair excitation, so both geminal models are exact
//! and must reproduce the lowest eigenvalue of the two-determinant Hamiltonian.

use std::path::PathBuf;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;
    use geminals::config::Config;
    use geminals::create_solver;
    use geminals::io::print_solution;
    use std::fs;

    fn example_path(filename: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("example")
            .join(filename)
    }

    fn load_config(filename: &str) -> Config {
        let content = fs::read_to_string(example_path(filename)).unwrap();
        serde_yml::from_str::<Config>(&content).unwrap().with_defaults()
    }

    fn exact_energy(config: &Config) -> f64 {
        let ints = config.integrals.build().unwrap();
        let ground = 2.0 * ints.h(0, 0) + ints.g(0, 0, 0, 0);
        let excited = 2.0 * ints.h(1, 1) + ints.g(1, 1, 1, 1);
        let coupling = ints.g(0, 0, 1, 1);
        let half_gap = 0.5 * (ground - excited);
        0.5 * (ground + excited) - (half_gap * half_gap + coupling * coupling).sqrt()
            + ints.nuclear_repulsion()
    }

    fn run(config: &Config) -> f64 {
        let mut geminal = config.build_geminal().unwrap();
        let solver = create_solver(&config.solver_algorithm(), config.solver_settings()).unwrap();
        let x0 = config.initial_params(&geminal, solver.as_ref()).unwrap();
        let outcome = geminal.solve(solver.as_ref(), x0).unwrap();
        assert!(outcome.success, "{}", outcome.message);

        let mut report = Vec::new();
        print_solution(&mut report, &geminal, &outcome).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert!(report.contains("Total energy"));

        geminal.energy().unwrap()
    }

    #[test]
    fn test_h2_apig_integration() {
        let config = load_config("h2_apig.yaml");
        assert!(config.use_ap1rog_guess());
        let energy = run(&config);
        assert_relative_eq!(energy, exact_energy(&config), epsilon = 1e-7);
        assert_relative_eq!(energy, -1.1373, epsilon = 1e-3);
    }

    #[test]
    fn test_h2_ap1rog_integration() {
        let config = load_config("h2_ap1rog.yaml");
        assert_eq!(config.solver_algorithm(), "lm");
        let energy = run(&config);
        assert_relative_eq!(energy, exact_energy(&config), epsilon = 1e-7);
    }
}
