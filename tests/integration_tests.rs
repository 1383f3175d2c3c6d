use clap::Parser;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use transcript_etl::utils::error::ErrorSeverity;
use transcript_etl::utils::validation::Validate;
use transcript_etl::{CliConfig, EtlEngine, LocalStorage, TomlConfig, TranscriptPipeline};

const ENROLLMENT: &str = "\
Nama Mata Ajar,SKS,Semester,Nilai
Kalkulus I,3,2021/2022 Ganjil - Reguler,D
Fisika Dasar 1,3,2021/2022 Ganjil - Reguler,B
Pengantar Teknik,2,2021/2022 Ganjil - Reguler,A
Kalkulus I,3,2021/2022 Genap - Reguler,A
Kimia Dasar,2,2021/2022 Genap - Reguler,E
Robotika,3,2021/2022 Genap - Reguler,AB
Metode Numerik,3,2022/2023 Ganjil - Reguler,*BT
";

const REQUIRED: &str = "\
Mata Kuliah,SKS,Semester,Prasyarat
Kalkulus I,3,1,-
Fisika Dasar I,3,1,-
Kimia Dasar,2,1,-
Pengantar Teknik,2,1,-
Metode Numerik,3,3,Kalkulus I
";

const ELECTIVE: &str = "\
Mata Kuliah,SKS
Robotika,3
Kecerdasan Buatan,3
";

fn write_fixtures(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir.join("data"))?;
    std::fs::write(dir.join("data/enrollment.csv"), ENROLLMENT)?;
    std::fs::write(dir.join("data/required.csv"), REQUIRED)?;
    std::fs::write(dir.join("data/elective.csv"), ELECTIVE)?;
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::from_slice(&std::fs::read(path)?)?)
}

#[tokio::test]
async fn test_end_to_end_toml_config() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(temp_dir.path())?;

    let config = TomlConfig::from_toml_str(
        r#"
[report]
name = "student-42"

[input]
enrollment = "data/enrollment.csv"
required_catalog = "data/required.csv"
elective_catalog = "data/elective.csv"

[output]
path = "out"
formats = ["csv", "json"]
"#,
    )?;
    config.validate()?;

    let pipeline = TranscriptPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let output = EtlEngine::new(pipeline).run().await?;
    assert_eq!(output, "out");

    let out_dir = temp_dir.path().join("out");
    for name in ["summary.csv", "transcript.csv", "in_progress.csv", "terms.csv", "unmatched.csv"] {
        assert!(out_dir.join(name).exists(), "{} missing", name);
    }
    assert!(!out_dir.join("rejected.csv").exists());

    let json = read_json(&out_dir.join("report.json"))?;
    let report = &json["report"];

    // Kalkulus I D then A collapses to one A record in the Genap term
    let kalkulus = &report["transcript"]["Kalkulus I"];
    assert_eq!(kalkulus["grade"], "A");
    assert_eq!(kalkulus["term"], "2021/2022 Genap");

    assert!(report["transcript"].get("Kimia Dasar").is_none());
    assert_eq!(report["in_progress"].as_array().map(Vec::len), Some(1));

    let average = report["summary"]["cumulative_average"].as_f64().unwrap_or_default();
    assert!((average - 39.5 / 11.0).abs() < 1e-9);
    assert_eq!(report["summary"]["credited_units"], 11);

    let entitlements: Vec<u64> = report["terms"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|t| t["entitlement"].as_u64())
        .collect();
    assert_eq!(entitlements, [0, 18, 24]);

    let required = &report["summary"]["required"];
    assert_eq!(required["status"], "computed");
    assert_eq!(required["catalog_units"], 13);
    assert_eq!(required["credited_units"], 8);
    assert_eq!(required["including_in_progress_units"], 13);

    let elective = &report["summary"]["elective"];
    assert_eq!(elective["credited_units"], 3);
    assert_eq!(elective["unmatched_credited"][0]["course_name"], "Kecerdasan Buatan");

    assert_eq!(report["diagnostics"].as_array().map(Vec::len), Some(0));

    let terms_csv = std::fs::read_to_string(out_dir.join("terms.csv"))?;
    assert!(terms_csv.contains("2021/2022 Ganjil,8,20.0,2.5,0,0,18"));

    Ok(())
}

#[tokio::test]
async fn test_end_to_end_cli_zip_with_simulation() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(temp_dir.path())?;
    let data = temp_dir.path().join("data");
    let out = temp_dir.path().join("out");

    let config = CliConfig::try_parse_from([
        "transcript-etl".to_string(),
        "--enrollment".to_string(),
        data.join("enrollment.csv").display().to_string(),
        "--required-catalog".to_string(),
        data.join("required.csv").display().to_string(),
        "--output-path".to_string(),
        out.display().to_string(),
        "--output-formats".to_string(),
        "tsv".to_string(),
        "--zip".to_string(),
        "report.zip".to_string(),
        "--simulate".to_string(),
        "Metode Numerik=A".to_string(),
    ])?;
    config.validate()?;

    let pipeline = TranscriptPipeline::new(LocalStorage::new("."), config);
    let output = EtlEngine::new_with_monitoring(pipeline, false).run().await?;
    assert!(output.ends_with("report.zip"));

    let mut archive = zip::ZipArchive::new(std::fs::File::open(out.join("report.zip"))?)?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    assert!(names.contains(&"summary.tsv".to_string()));
    assert!(!names.iter().any(|n| n.ends_with(".csv") || n.ends_with(".json")));

    let mut summary = String::new();
    archive.by_name("summary.tsv")?.read_to_string(&mut summary)?;
    assert!(summary.contains("projected_average\t3.6786"));
    assert!(summary.contains("elective_completion\tno data"));

    Ok(())
}

#[tokio::test]
async fn test_rejected_rows_are_written() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(temp_dir.path())?;
    let dirty = format!("{}Statistika,,2021/2022 Genap,B\n", ENROLLMENT);
    std::fs::write(temp_dir.path().join("data/enrollment.csv"), dirty)?;

    let config = TomlConfig::from_toml_str(
        r#"
[report]
name = "dirty"

[input]
enrollment = "data/enrollment.csv"

[output]
path = "out"
formats = ["csv"]
"#,
    )?;

    let pipeline = TranscriptPipeline::new(LocalStorage::new(temp_dir.path()), config);
    EtlEngine::new(pipeline).run().await?;

    let rejected = std::fs::read_to_string(temp_dir.path().join("out/rejected.csv"))?;
    let mut lines = rejected.lines();
    assert_eq!(lines.next(), Some("dataset,line,reason"));
    assert!(lines.next().unwrap_or_default().starts_with("enrollment,9,"));

    let summary = std::fs::read_to_string(temp_dir.path().join("out/summary.csv"))?;
    assert!(summary.contains("required_completion,no data"));

    Ok(())
}

#[tokio::test]
async fn test_missing_enrollment_is_critical() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    let config = TomlConfig::from_toml_str(
        r#"
[report]
name = "missing"

[input]
enrollment = "nowhere.csv"

[output]
path = "out"
formats = ["json"]
"#,
    )?;

    let pipeline = TranscriptPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let err = match EtlEngine::new(pipeline).run().await {
        Ok(path) => anyhow::bail!("expected failure, got output at {}", path),
        Err(e) => e,
    };

    assert_eq!(err.severity(), ErrorSeverity::Critical);
    assert!(err.user_friendly_message().contains("not found"));
    assert!(!temp_dir.path().join("out").exists());

    Ok(())
}
