//! Tests for engine module

use super::*;
use crate::catalog::FileCatalog;
use crate::config::{DatasetDescriptor, JobConfig};
use crate::error::Error;
use crate::types::RunProperties;
use crate::workflow::{FileWorkflowStore, WorkflowRun, WorkflowStore, TARGET_PROPERTY};
use arrow::array::AsArray;
use arrow::datatypes::{DataType, Int32Type};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;

const CATALOG_YAML: &str = r"
databases:
  pfs_dev:
    tables:
      - name: mesh_info
        columns:
          - { name: id, type: int }
          - { name: name, type: string }
        partition_keys:
          - { name: dt, type: string }
      - name: daily
        columns:
          - { name: id, type: int }
        partition_keys:
          - { name: dt, type: int }
";

struct Fixture {
    input: Bucket,
    output: Bucket,
    catalog: Arc<FileCatalog>,
    workflow: Arc<FileWorkflowStore>,
}

impl Fixture {
    async fn new(files: &[(&str, &str)]) -> Self {
        let input = Bucket::in_memory("input");
        for (key, contents) in files {
            input
                .put(key, Bytes::from(contents.to_string()))
                .await
                .unwrap();
        }
        Self {
            input,
            output: Bucket::in_memory("output"),
            catalog: Arc::new(FileCatalog::from_yaml_str(CATALOG_YAML).unwrap()),
            workflow: Arc::new(FileWorkflowStore::in_memory()),
        }
    }

    fn config(&self, workflow: bool) -> JobConfig {
        let config = JobConfig::new(Some("input".into()), Some("output".into()))
            .unwrap()
            .with_database(Some("pfs_dev".into()))
            .with_datasets(vec![DatasetDescriptor::new(
                "mesh-info",
                "MeshInfo",
                "mesh_info",
            )])
            .unwrap();
        if workflow {
            config.with_workflow(Some("pfs".into()), Some("wr_1".into()))
        } else {
            config
        }
    }

    fn job(&self, workflow: bool) -> SyncJob {
        SyncJob::new(
            self.config(workflow),
            self.input.clone(),
            self.output.clone(),
            self.catalog.clone(),
        )
        .with_workflow_store(self.workflow.clone())
    }

    async fn output_keys(&self) -> Vec<String> {
        self.output.list_keys("mesh-info/").await.unwrap()
    }

    async fn read_output(&self, key: &str) -> RecordBatch {
        let data = self.output.get(key).await.unwrap();
        let batches: Vec<RecordBatch> = ParquetRecordBatchReaderBuilder::try_new(data)
            .unwrap()
            .build()
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        arrow::compute::concat_batches(&batches[0].schema(), &batches).unwrap()
    }
}

fn run() -> WorkflowRun {
    WorkflowRun::new("pfs", "wr_1")
}

fn target_props(value: &str) -> RunProperties {
    RunProperties::from([(TARGET_PROPERTY.to_string(), value.to_string())])
}

// ============================================================================
// SyncStats Tests
// ============================================================================

#[test]
fn test_sync_stats() {
    let mut stats = SyncStats::new();
    stats.add_file();
    stats.add_file();
    stats.add_output(10, 1);
    stats.add_output(5, 2);
    stats.add_marker();
    stats.add_partitions(3);
    stats.add_dataset();
    stats.set_duration(100);

    assert_eq!(stats.files_converted, 2);
    assert_eq!(stats.rows_written, 15);
    assert_eq!(stats.parquet_files, 3);
    assert_eq!(stats.empty_markers, 1);
    assert_eq!(stats.partitions_registered, 3);
    assert_eq!(stats.datasets_synced, 1);
    assert_eq!(stats.duration_ms, 100);
}

#[test]
fn test_file_name() {
    assert_eq!(file_name("dt=2023-01-01/part.csv"), "part.csv");
    assert_eq!(file_name("dt=2023-01-01/part.0001.csv"), "part.0001.csv");
    assert_eq!(file_name("part"), "part");
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_converts_example_file() {
    let fixture = Fixture::new(&[(
        "mesh-info/dt=2023-01-01/part.csv",
        "id,name\n1,alpha\n2,beta\n",
    )])
    .await;

    let report = fixture.job(true).run().await.unwrap();

    assert_eq!(
        report.diff.files("mesh-info"),
        ["dt=2023-01-01/part.csv"]
    );
    assert_eq!(
        fixture.output_keys().await,
        vec!["mesh-info/dt=2023-01-01/part.csv.parquet".to_string()]
    );

    let batch = fixture
        .read_output("mesh-info/dt=2023-01-01/part.csv.parquet")
        .await;
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema().field(0).data_type(), &DataType::Int32);
    assert_eq!(batch.schema().field(1).data_type(), &DataType::Utf8);
    assert_eq!(
        batch.column(0).as_primitive::<Int32Type>().values().to_vec(),
        vec![1, 2]
    );
    assert!(batch.schema().index_of("dt").is_err());

    let partitions = fixture.catalog.partitions("pfs_dev", "mesh_info").await;
    assert_eq!(partitions.len(), 1);
    assert_eq!(partitions[0].values, vec!["2023-01-01".to_string()]);

    assert_eq!(report.stats.files_converted, 1);
    assert_eq!(report.stats.rows_written, 2);
    assert_eq!(report.stats.parquet_files, 1);
    assert_eq!(report.stats.partitions_registered, 1);
    assert_eq!(report.published_target.as_deref(), Some("2023-01-01"));

    let props = fixture.workflow.get_run_properties(&run()).await.unwrap();
    assert_eq!(props.get(TARGET_PROPERTY).unwrap(), "2023-01-01");
}

#[tokio::test]
async fn test_second_run_is_noop() {
    let fixture = Fixture::new(&[(
        "mesh-info/dt=2023-01-01/part.csv",
        "id,name\n1,alpha\n",
    )])
    .await;

    fixture.job(false).run().await.unwrap();
    let before = fixture.output_keys().await;

    let report = fixture.job(false).run().await.unwrap();
    assert!(report.diff.is_empty());
    assert_eq!(report.stats.files_converted, 0);
    assert_eq!(report.stats.parquet_files, 0);
    assert_eq!(fixture.output_keys().await, before);
}

#[tokio::test]
async fn test_supplied_targets_restrict_processing() {
    let fixture = Fixture::new(&[
        ("mesh-info/dt=A/part.csv", "id,name\n1,a\n"),
        ("mesh-info/dt=B/part.csv", "id,name\n2,b\n"),
        ("mesh-info/dt=C/part.csv", "id,name\n3,c\n"),
    ])
    .await;
    fixture.workflow.seed(&run(), target_props("A,B")).await;

    let report = fixture.job(true).run().await.unwrap();

    assert_eq!(
        fixture.output_keys().await,
        vec![
            "mesh-info/dt=A/part.csv.parquet".to_string(),
            "mesh-info/dt=B/part.csv.parquet".to_string(),
        ]
    );
    assert_eq!(report.supplied_targets.unwrap().to_string(), "A,B");

    // a supplied Target is left untouched
    let props = fixture.workflow.get_run_properties(&run()).await.unwrap();
    assert_eq!(props.get(TARGET_PROPERTY).unwrap(), "A,B");
}

#[tokio::test]
async fn test_touched_partitions_become_target() {
    let fixture = Fixture::new(&[
        ("mesh-info/dt=X/a.csv", "id,name\n1,a\n"),
        ("mesh-info/dt=X/b.csv", "id,name\n2,b\n"),
        ("mesh-info/dt=Y/a.csv", "id,name\n3,c\n"),
    ])
    .await;
    fixture
        .workflow
        .seed(
            &run(),
            RunProperties::from([("Env".to_string(), "dev".to_string())]),
        )
        .await;

    fixture.job(true).run().await.unwrap();

    let props = fixture.workflow.get_run_properties(&run()).await.unwrap();
    assert_eq!(props.get(TARGET_PROPERTY).unwrap(), "X,Y");
    assert_eq!(props.get("Env").unwrap(), "dev");
}

#[tokio::test]
async fn test_zero_row_file_writes_marker() {
    let fixture = Fixture::new(&[("mesh-info/dt=2023-01-03/part.csv", "id,name\n")]).await;

    let report = fixture.job(false).run().await.unwrap();

    assert_eq!(
        fixture.output_keys().await,
        vec!["mesh-info/dt=2023-01-03/_empty".to_string()]
    );
    assert_eq!(report.stats.empty_markers, 1);
    assert_eq!(report.stats.parquet_files, 0);
    assert!(fixture
        .catalog
        .partitions("pfs_dev", "mesh_info")
        .await
        .is_empty());

    // the marker makes the partition visible to the next diff
    let report = fixture.job(false).run().await.unwrap();
    assert!(report.diff.is_empty());
}

#[tokio::test]
async fn test_missing_table_aborts_only_with_new_files() {
    let fixture = Fixture::new(&[]).await;
    let config = fixture
        .config(false)
        .with_datasets(vec![DatasetDescriptor::new("other", "Other", "other")])
        .unwrap();
    let job = SyncJob::new(
        config.clone(),
        fixture.input.clone(),
        fixture.output.clone(),
        fixture.catalog.clone(),
    );
    job.run().await.unwrap();

    fixture
        .input
        .put("other/dt=1/a.csv", Bytes::from_static(b"id\n1\n"))
        .await
        .unwrap();
    let job = SyncJob::new(
        config,
        fixture.input.clone(),
        fixture.output.clone(),
        fixture.catalog.clone(),
    );
    let err = job.run().await.unwrap_err();
    assert!(matches!(err, Error::TableNotFound { .. }));
}

#[tokio::test]
async fn test_invalid_value_aborts_run() {
    let fixture = Fixture::new(&[("mesh-info/dt=1/part.csv", "id,name\nabc,x\n")]).await;

    let err = fixture.job(false).run().await.unwrap_err();
    assert!(matches!(err, Error::SchemaMapping { .. }));
    assert!(fixture.output_keys().await.is_empty());
}

#[tokio::test]
async fn test_run_requires_database() {
    let fixture = Fixture::new(&[]).await;
    let config = JobConfig::new(Some("input".into()), Some("output".into())).unwrap();
    let job = SyncJob::new(
        config,
        fixture.input.clone(),
        fixture.output.clone(),
        fixture.catalog.clone(),
    );
    let err = job.run().await.unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[tokio::test]
async fn test_workflow_without_store_is_config_error() {
    let fixture = Fixture::new(&[]).await;
    let job = SyncJob::new(
        fixture.config(true),
        fixture.input.clone(),
        fixture.output.clone(),
        fixture.catalog.clone(),
    );
    assert!(job.diff().await.unwrap_err().is_config());
}

#[tokio::test]
async fn test_diff_does_not_write() {
    let fixture = Fixture::new(&[("mesh-info/dt=1/part.csv", "id,name\n1,a\n")]).await;

    let diff = fixture.job(true).diff().await.unwrap();
    assert_eq!(diff.files("mesh-info"), ["dt=1/part.csv"]);
    assert!(fixture.output_keys().await.is_empty());
    assert!(fixture
        .workflow
        .get_run_properties(&run())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_same_stem_files_keep_separate_outputs() {
    let fixture = Fixture::new(&[
        ("mesh-info/dt=1/a.csv", "id,name\n1,csv\n"),
        ("mesh-info/dt=1/a.txt", "id,name\n2,txt\n"),
    ])
    .await;

    let report = fixture.job(false).run().await.unwrap();

    assert_eq!(report.stats.parquet_files, 2);
    assert_eq!(
        fixture.output_keys().await,
        vec![
            "mesh-info/dt=1/a.csv.parquet".to_string(),
            "mesh-info/dt=1/a.txt.parquet".to_string(),
        ]
    );
    let batch = fixture.read_output("mesh-info/dt=1/a.txt.parquet").await;
    assert_eq!(
        batch.column(0).as_primitive::<Int32Type>().values().to_vec(),
        vec![2]
    );
}

#[tokio::test]
async fn test_converts_key_with_reserved_characters() {
    let fixture = Fixture::new(&[(
        "mesh-info/dt=2023-01-01/part[1].csv",
        "id,name\n1,alpha\n",
    )])
    .await;

    let report = fixture.job(false).run().await.unwrap();

    assert_eq!(
        report.diff.files("mesh-info"),
        ["dt=2023-01-01/part[1].csv"]
    );
    assert_eq!(
        fixture.output_keys().await,
        vec!["mesh-info/dt=2023-01-01/part[1].csv.parquet".to_string()]
    );

    let report = fixture.job(false).run().await.unwrap();
    assert!(report.diff.is_empty());
}

#[tokio::test]
async fn test_typed_partition_keeps_source_directory() {
    let fixture = Fixture::new(&[("daily/dt=07/part.csv", "id\n1\n2\n")]).await;
    let config = fixture
        .config(false)
        .with_datasets(vec![DatasetDescriptor::new("daily", "Daily", "daily")])
        .unwrap();
    let job = || {
        SyncJob::new(
            config.clone(),
            fixture.input.clone(),
            fixture.output.clone(),
            fixture.catalog.clone(),
        )
    };

    job().run().await.unwrap();
    assert_eq!(
        fixture.output.list_keys("daily/").await.unwrap(),
        vec!["daily/dt=07/part.csv.parquet".to_string()]
    );
    let partitions = fixture.catalog.partitions("pfs_dev", "daily").await;
    assert_eq!(partitions[0].values, vec!["07".to_string()]);

    let report = job().run().await.unwrap();
    assert!(report.diff.is_empty());
    assert_eq!(report.stats.files_converted, 0);
}

#[tokio::test]
async fn test_directory_marker_in_output_skips_partition() {
    let fixture = Fixture::new(&[
        ("mesh-info/dt=1/a.csv", "id,name\n1,a\n"),
        ("mesh-info/dt=2/a.csv", "id,name\n2,b\n"),
    ])
    .await;
    fixture
        .output
        .put("mesh-info/dt=1/", Bytes::new())
        .await
        .unwrap();

    let report = fixture.job(false).run().await.unwrap();

    assert_eq!(report.diff.files("mesh-info"), ["dt=2/a.csv"]);
    assert_eq!(report.stats.files_converted, 1);
    assert_eq!(
        fixture.output_keys().await,
        vec![
            "mesh-info/dt=1".to_string(),
            "mesh-info/dt=2/a.csv.parquet".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_malformed_csv_is_csv_error() {
    let fixture = Fixture::new(&[("mesh-info/dt=1/bad.csv", "id,name\n1,a,extra\n")]).await;

    let err = fixture.job(false).run().await.unwrap_err();
    match err {
        Error::CsvParse { message } => {
            assert!(message.starts_with("memory://input/mesh-info/dt=1/bad.csv: "));
        }
        other => panic!("expected CsvParse, got {other:?}"),
    }
    assert!(fixture.output_keys().await.is_empty());
}
