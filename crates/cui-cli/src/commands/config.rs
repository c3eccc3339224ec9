use cui_core::Config;
use std::path::Path;

const SAMPLE_CONFIG: &str = r#"# cui configuration

condor:
  submit_tool: condor_submit
  query_tool: condor_q
  remove_tool: condor_rm
  attach_tool: condor_ssh_to_job
  universe: vanilla
  idle_executable: /bin/sleep
  max_lifetime_secs: 86400
  marker_attribute: ClusterUI
  mount:
    path: /cvmfs/cms.cern.ch
    tool: attr
    attribute: CVMFS_cms_cern_ch_REVISION

session:
  poll_interval_ms: 200
  # monitor_timeout_secs: 3600
  # workspace_root: /scratch/cui
"#;

pub fn run(explicit: Option<&Path>, path: bool, init: bool) -> anyhow::Result<()> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);

    if path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config already exists at: {}", config_path.display());
            println!("Remove it first if you want to reinitialize.");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, SAMPLE_CONFIG)?;
        println!("Sample config written to: {}", config_path.display());
        return Ok(());
    }

    println!("Config path: {}", config_path.display());
    if config_path.exists() {
        let config = Config::load_from(&config_path)?;
        println!("Submit:      {}", config.condor.submit_tool);
        println!("Attach:      {}", config.condor.attach_tool);
        println!("Lifetime:    {}s", config.condor.max_lifetime_secs);
        println!("Workspaces:  {}", config.session.workspace_root().display());
    } else {
        println!("Status:      not found (using defaults)");
        println!("Run `cui config --init` to create one.");
    }

    Ok(())
}
