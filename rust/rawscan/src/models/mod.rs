pub mod data_point_list;
pub mod peak_list;
pub mod raw_data_file;
pub mod scan;
pub mod scan_metadata;

pub use data_point_list::{
    DataPointList,
    MismatchedColumns,
};
pub use peak_list::{
    ColumnInfo,
    PeakListColumn,
    PeakListRow,
};
pub use raw_data_file::{
    ParserHandleGuard,
    RawDataFile,
};
pub use scan::{
    Scan,
    ScanInfo,
};
pub use scan_metadata::{
    ActivationInfo,
    ActivationType,
    ChromatographyInfo,
    IsolationInfo,
    MsFunction,
    MsScanType,
    MsSpectrumType,
    PolarityType,
};
