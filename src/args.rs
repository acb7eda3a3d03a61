use clap::Parser;

/// Run an answer agreement analysis on the command line.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file with the data for analysis. Only .csv, .xls and .xlsx files are supported.
    #[clap(value_parser)]
    pub datafile: String,

    /// (file path, optional) The XlsForm used to create this dataset. Not all datasets come from ODK.
    /// If supplied, the XlsForm information is used to remove points of comparison, such as "calculate" types.
    #[clap(short = 'x', long, value_parser)]
    pub xlsform: Option<String>,

    /// (column name, optional) The column used to identify groups in the dataset. If not supplied,
    /// the entire dataset is treated as from one group.
    #[clap(short = 'g', long = "group_column", value_parser)]
    pub group_column: Option<String>,

    /// (column name, optional) The first column to analyze. If not supplied, the first column of
    /// the dataset is used.
    #[clap(short = 'f', long, value_parser)]
    pub first: Option<String>,

    /// (column name, optional) The last column to analyze. If not supplied, the last column of
    /// the dataset is used.
    #[clap(short = 'l', long, value_parser)]
    pub last: Option<String>,

    /// If passed as an argument (with no value), the group prefix separator is switched to the
    /// hyphen "-". By default, the colon ":" is used. This is only used with an XlsForm.
    #[clap(short = 's', long, takes_value = false)]
    pub separator: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an analysis in JSON format. If provided, aa will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, lists the columns with disagreement after the summary of each group.
    #[clap(short, long, takes_value = false)]
    pub disagreements: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
