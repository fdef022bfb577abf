use rawscan::errors::{
    ImportError,
    ScanAccessError,
};
use rawscan::{
    ImportConfig,
    ImportTask,
    ParserFormat,
    Project,
    RawDataFilesSelection,
    TupleRange,
    import_files,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

const SAMPLE_MGF: &str = "BEGIN IONS
TITLE=sample.1.1.2
PEPMASS=445.12 10000
CHARGE=2+
RTINSECONDS=60.5
SCANS=1
100.0 5.0
200.0 50.0
300.0 1.0
END IONS

BEGIN IONS
TITLE=sample.2.2.1
RTINSECONDS=61.0
SCANS=2
END IONS

BEGIN IONS
TITLE=sample.3.3.2
PEPMASS=512.3
CHARGE=1+
RTINSECONDS=62.0
SCANS=3
110.1 12.0
220.2 8.0
END IONS
";

fn write_sample(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("rawscan_import_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_mgf_import_end_to_end() {
    let path = write_sample("end_to_end.mgf", SAMPLE_MGF);
    let imported = ImportTask::new(&path, ImportConfig::default()).run().unwrap();

    assert_eq!(imported.file.name(), "end_to_end.mgf");
    assert_eq!(imported.file.format_name(), "mgf");
    assert_eq!(imported.scans.len(), 3);

    let first = &imported.scans[0];
    assert_eq!(first.scan_number(), 1);
    assert_eq!(first.ms_function().ms_level, Some(2));
    assert_eq!(first.isolations()[0].precursor_mz, Some(445.12));
    assert_eq!(first.display_title(), "MS spectrum end_to_end.mgf#1");

    let window = first
        .data_points_by_mz_and_intensity(
            &TupleRange::try_new(150.0, 250.0).unwrap(),
            &TupleRange::try_new(0.0, 100.0).unwrap(),
        )
        .unwrap();
    assert_eq!(window.iter().collect::<Vec<_>>(), vec![(200.0, 50.0)]);

    let none = first
        .data_points_by_mz_and_intensity(
            &TupleRange::try_new(0.0, 1000.0).unwrap(),
            &TupleRange::try_new(10.0, 20.0).unwrap(),
        )
        .unwrap();
    assert!(none.is_empty());

    assert!(imported.scans[1].data_points().unwrap().is_empty());

    imported.file.dispose();
    assert!(matches!(
        imported.scans[2].data_points(),
        Err(ScanAccessError::ResourceDisposed { .. })
    ));
}

#[test]
fn test_cancelled_before_start() {
    let path = write_sample("cancelled.mgf", SAMPLE_MGF);
    let task = ImportTask::new(&path, ImportConfig::default());
    task.cancel_flag().store(true, Ordering::Relaxed);
    assert!(matches!(
        task.run(),
        Err(ImportError::Cancelled { completed: 0, .. })
    ));
}

#[test]
fn test_import_files_into_project() {
    let paths = vec![
        write_sample("run_a.mgf", SAMPLE_MGF),
        write_sample("run_b.mgf", SAMPLE_MGF),
        write_sample("broken.xyz", "this is not a mass spectrometry file\n"),
        PathBuf::from("/does/not/exist.mgf"),
    ];
    let config = ImportConfig {
        num_threads: Some(2),
        show_progress: false,
        skip_empty_spectra: true,
        format: ParserFormat::Auto,
    };

    let results = import_files(&paths, &config, &Arc::new(AtomicBool::new(false))).unwrap();
    assert_eq!(results.len(), 4);
    assert!(matches!(results[2], Err(ImportError::Parse { .. })));
    assert!(matches!(results[3], Err(ImportError::Unreadable { .. })));

    let project = Project::new();
    for res in results.into_iter().flatten() {
        assert_eq!(res.scans.len(), 2);
        project.add(res);
    }
    let selected = RawDataFilesSelection::NamePattern("run_*.mgf".into())
        .matching_files(&project)
        .unwrap();
    assert_eq!(selected.len(), 2);
}

#[test]
fn test_shared_flag_cancels_every_file() {
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| write_sample(&format!("parallel_{}.mgf", i), SAMPLE_MGF))
        .collect();
    let config = ImportConfig {
        num_threads: Some(2),
        show_progress: false,
        ..Default::default()
    };
    let cancelled = Arc::new(AtomicBool::new(false));

    let before = import_files(&paths, &config, &cancelled).unwrap();
    assert!(before.iter().all(|res| res.is_ok()));

    cancelled.store(true, Ordering::Relaxed);
    let after = import_files(&paths, &config, &cancelled).unwrap();
    assert_eq!(after.len(), 4);
    for res in &after {
        assert!(matches!(res, Err(ImportError::Cancelled { completed: 0, .. })));
    }
}
