//! CLI argument parsing and circuit-loading tests.
//!
//! The CLI is a binary crate, so the flag surface is re-declared here
//! (mirroring `src/main.rs::Cli`) and exercised via `try_parse_from`;
//! circuit parsing itself is tested directly against `arvak-qasm3`.

mod clap_parsing {
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(name = "arvak")]
    struct TestCli {
        input_circuit: Option<PathBuf>,
        #[arg(short = 'q', long = "qubits", default_value_t = 12)]
        qubits: u32,
        #[arg(short = 's', long = "shots", default_value_t = 1024)]
        shots: u64,
        #[arg(long = "svd-cutoff", default_value_t = 1.0e-8)]
        svd_cutoff: f64,
        #[arg(long = "max-bond-dimension", default_value_t = 256)]
        max_bond_dimension: usize,
        #[arg(long = "random")]
        random: Option<u32>,
        #[arg(long = "threshold", default_value_t = 0.05)]
        threshold: f64,
        #[arg(long = "acc", default_value = "tnqvm-exatn-mps")]
        acc: String,
        #[arg(short = 'n', long = "noise")]
        noise: bool,
        #[arg(short = 'x', long = "xasm")]
        xasm: bool,
        #[arg(long = "quil1")]
        quil1: bool,
        #[arg(long = "noplacement")]
        noplacement: bool,
        #[arg(long = "optimise")]
        optimise: bool,
        #[arg(long = "nosim")]
        nosim: bool,
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    }

    #[test]
    fn test_parse_defaults_with_input_only() {
        let cli = TestCli::try_parse_from(["arvak", "circuit.qasm"]).unwrap();
        assert_eq!(cli.input_circuit.unwrap(), PathBuf::from("circuit.qasm"));
        assert_eq!(cli.qubits, 12);
        assert_eq!(cli.shots, 1024);
        assert_eq!(cli.svd_cutoff, 1.0e-8);
        assert_eq!(cli.max_bond_dimension, 256);
        assert!(cli.random.is_none());
        assert_eq!(cli.threshold, 0.05);
        assert_eq!(cli.acc, "tnqvm-exatn-mps");
        assert!(!cli.noise && !cli.xasm && !cli.quil1 && !cli.noplacement);
        assert!(!cli.optimise && !cli.nosim);
    }

    #[test]
    fn test_parse_with_no_input_circuit() {
        let cli = TestCli::try_parse_from(["arvak"]).unwrap();
        assert!(cli.input_circuit.is_none());
    }

    #[test]
    fn test_parse_qubits_and_shots() {
        let cli = TestCli::try_parse_from(["arvak", "-q", "4", "-s", "2048", "bell.qasm"]).unwrap();
        assert_eq!(cli.qubits, 4);
        assert_eq!(cli.shots, 2048);
    }

    #[test]
    fn test_parse_noise_and_xasm_flags() {
        let cli = TestCli::try_parse_from(["arvak", "-n", "-x", "kernel.xasm"]).unwrap();
        assert!(cli.noise);
        assert!(cli.xasm);
        assert!(!cli.quil1);
    }

    #[test]
    fn test_parse_quil1_flag() {
        let cli = TestCli::try_parse_from(["arvak", "--quil1", "program.quil"]).unwrap();
        assert!(cli.quil1);
    }

    #[test]
    fn test_parse_random_depth() {
        let cli = TestCli::try_parse_from(["arvak", "--random", "4", "-q", "4"]).unwrap();
        assert_eq!(cli.random, Some(4));
    }

    #[test]
    fn test_parse_nosim_and_optimise() {
        let cli = TestCli::try_parse_from(["arvak", "--nosim", "--optimise", "bell.qasm"]).unwrap();
        assert!(cli.nosim);
        assert!(cli.optimise);
    }

    #[test]
    fn test_parse_noplacement() {
        let cli = TestCli::try_parse_from(["arvak", "--noplacement", "bell.qasm"]).unwrap();
        assert!(cli.noplacement);
    }

    #[test]
    fn test_parse_acc_and_threshold() {
        let cli =
            TestCli::try_parse_from(["arvak", "--acc", "aer", "--threshold", "0.1", "bell.qasm"])
                .unwrap();
        assert_eq!(cli.acc, "aer");
        assert_eq!(cli.threshold, 0.1);
    }

    #[test]
    fn test_parse_mps_flags() {
        let cli = TestCli::try_parse_from([
            "arvak",
            "--svd-cutoff",
            "1e-6",
            "--max-bond-dimension",
            "64",
            "bell.qasm",
        ])
        .unwrap();
        assert_eq!(cli.svd_cutoff, 1e-6);
        assert_eq!(cli.max_bond_dimension, 64);
    }

    #[test]
    fn test_parse_verbose_levels() {
        let cli = TestCli::try_parse_from(["arvak", "-vvv", "bell.qasm"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let result = TestCli::try_parse_from(["arvak", "--not-a-real-flag"]);
        assert!(result.is_err());
    }
}

mod circuit_loading {
    use arvak_qasm3::{parse, parse_xasm, parse_quil};
    use std::fs;

    #[test]
    fn test_parse_valid_qasm() {
        let qasm = "OPENQASM 3.0; qubit[2] q; h q[0]; cx q[0], q[1];";
        let circuit = parse(qasm).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
    }

    #[test]
    fn test_parse_invalid_qasm() {
        assert!(parse("this is not valid qasm").is_err());
    }

    #[test]
    fn test_parse_xasm_kernel() {
        let source = r"
            __qpu__ void QBCIRCUIT(qbit q) {
                H(q[0]);
                CNOT(q[0],q[1]);
                Measure(q[0]);
                Measure(q[1]);
            }
        ";
        let circuit = parse_xasm(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
    }

    #[test]
    fn test_parse_quil_program() {
        let circuit = parse_quil("H 0\nCNOT 0 1\nMEASURE 0 ro[0]\n").unwrap();
        assert_eq!(circuit.num_qubits(), 2);
    }

    #[test]
    fn test_load_circuit_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.qasm");
        fs::write(&path, "OPENQASM 3.0; qubit[2] q; h q[0]; cx q[0], q[1];").unwrap();

        let source = fs::read_to_string(&path).unwrap();
        let circuit = parse(&source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let path = "/tmp/arvak_test_nonexistent_file_12345.qasm";
        assert!(!std::path::Path::new(path).exists());
    }
}
