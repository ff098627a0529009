//! CI/CD integration snippet generators.
//!
//! These produce guidance text only: nothing here talks to the graph
//! server or touches the caller's repository. The docker commands follow
//! the agent images' CLI (`analyze` and `send_build_info` subcommands)
//! and parameterize the per-platform pipeline variables.

use crate::models::{AgentType, CiPlatform, OutputFormat};
use std::fmt::Write;

/// Pipeline metadata variables for one CI platform.
struct PlatformVars {
    job_name: &'static str,
    build_number: &'static str,
    build_status: &'static str,
    pipeline_system: &'static str,
}

fn platform_vars(platform: Option<CiPlatform>) -> PlatformVars {
    match platform {
        Some(CiPlatform::Jenkins) => PlatformVars {
            job_name: "${JOB_NAME}",
            build_number: "${BUILD_NUMBER}",
            build_status: "${currentBuild.result}",
            pipeline_system: "Jenkins",
        },
        Some(CiPlatform::GitHubActions) => PlatformVars {
            job_name: "${{ github.repository }}",
            build_number: "${{ github.run_number }}",
            build_status: "${{ job.status }}",
            pipeline_system: "GitHub Actions",
        },
        Some(CiPlatform::AzureDevOps) => PlatformVars {
            job_name: "${BUILD_DEFINITIONNAME}",
            build_number: "${BUILD_BUILDNUMBER}",
            build_status: "${AGENT_JOBSTATUS}",
            pipeline_system: "Azure DevOps",
        },
        Some(CiPlatform::GitLab) => PlatformVars {
            job_name: "${CI_PROJECT_NAME}",
            build_number: "${CI_PIPELINE_ID}",
            build_status: "${CI_JOB_STATUS}",
            pipeline_system: "GitLab CI/CD",
        },
        None => PlatformVars {
            job_name: "${JOB_NAME}",
            build_number: "${BUILD_NUMBER}",
            build_status: "${BUILD_STATUS}",
            pipeline_system: "Generic",
        },
    }
}

/// Pipeline files a platform expects the integration to live in.
fn target_files(platform: Option<CiPlatform>) -> &'static str {
    match platform {
        Some(CiPlatform::Jenkins) => "`Jenkinsfile`",
        Some(CiPlatform::GitHubActions) => "`.github/workflows/*.yml`",
        Some(CiPlatform::AzureDevOps) => "`azure-pipelines.yml`",
        Some(CiPlatform::GitLab) => "`.gitlab-ci.yml`",
        None => "your pipeline definition file",
    }
}

/// Generate a docker agent scan configuration for a CI/CD pipeline.
#[must_use]
pub fn docker_agent_guide(
    agent: AgentType,
    scan_path: &str,
    application_name: &str,
    platform: Option<CiPlatform>,
) -> String {
    let image = format!("ripple_{}", agent.name());
    let vars = platform_vars(platform);

    format!(
        r#"# Ripple Docker Agent Setup

## Target Files to Modify
- {targets}

## Environment Variables to Add (store as secrets)
- `RIPPLE_HOST`: your graph server URL
- `AGENT_UUID`: agent authentication id
- `AGENT_PASSWORD`: agent authentication password

## Docker Scan Command

```bash
docker run \
    --pull always \
    --rm \
    --env RIPPLE_HOST="$RIPPLE_HOST" \
    --env AGENT_UUID="$AGENT_UUID" \
    --env AGENT_PASSWORD="$AGENT_PASSWORD" \
    --volume "$PWD:/scan" \
    {image}:latest analyze \
    --path="/scan/{scan_path}" \
    --application="{application_name}" \
    --scan-space="YOUR_SCAN_SPACE_NAME" \
    --server="$RIPPLE_HOST" \
    --verbose
```

## Setup Instructions
1. Add the three environment variables above to your CI secrets store.
2. Insert the scan command as a pipeline step after your build step.
3. Replace `YOUR_SCAN_SPACE_NAME` with your scan space naming strategy
   (environment-based, branch-based, or team-based).

## Validation Checks
- The agent image pulls successfully from your registry.
- The scan step reports `{application_name}` under the expected scan space.
- Pipeline metadata resolves: job `{job_name}`, build `{build_number}` on {pipeline_system}.
"#,
        targets = target_files(platform),
        image = image,
        scan_path = scan_path.trim_start_matches('/'),
        application_name = application_name,
        job_name = vars.job_name,
        build_number = vars.build_number,
        pipeline_system = vars.pipeline_system,
    )
}

/// Generate the build-metadata capture snippet.
#[must_use]
pub fn build_info_guide(platform: Option<CiPlatform>, format: OutputFormat) -> String {
    let vars = platform_vars(platform);
    let mut out = String::from(
        "# Ripple Build Information Capture\n\n\
         Build information is sent separately from the main scan; it attaches \
         build metadata, logs, and pipeline context to the analysis.\n\n",
    );

    match format {
        OutputFormat::Docker => {
            let _ = write!(
                out,
                r#"```bash
docker run \
    --pull always \
    --rm \
    --env RIPPLE_HOST="$RIPPLE_HOST" \
    --env AGENT_UUID="$AGENT_UUID" \
    --env AGENT_PASSWORD="$AGENT_PASSWORD" \
    --volume "$PWD/logs:/log_file_path" \
    ripple_agent:latest send_build_info \
    --agent-uuid="$AGENT_UUID" \
    --agent-password="$AGENT_PASSWORD" \
    --server="$RIPPLE_HOST" \
    --job-name="{job_name}" \
    --build-number="{build_number}" \
    --build-status="{build_status}" \
    --pipeline-system="{pipeline_system}" \
    --log-file="/log_file_path/build.log" \
    --log-lines=1000 \
    --timeout=60
```
"#,
                job_name = vars.job_name,
                build_number = vars.build_number,
                build_status = vars.build_status,
                pipeline_system = vars.pipeline_system,
            );
        }
        OutputFormat::Standalone => {
            let _ = write!(
                out,
                r#"```bash
export RIPPLE_JOB_NAME="{job_name}"
export RIPPLE_BUILD_NUMBER="{build_number}"
export RIPPLE_BUILD_STATUS="{build_status}"
export RIPPLE_PIPELINE_SYSTEM="{pipeline_system}"

ripple-agent send_build_info \
    --agent-uuid="$AGENT_UUID" \
    --agent-password="$AGENT_PASSWORD" \
    --server="$RIPPLE_HOST" \
    --log-file="./logs/build.log"
```
"#,
                job_name = vars.job_name,
                build_number = vars.build_number,
                build_status = vars.build_status,
                pipeline_system = vars.pipeline_system,
            );
        }
        OutputFormat::Jenkins => {
            let _ = write!(
                out,
                r#"```groovy
environment {{
    RIPPLE_JOB_NAME = "{job_name}"
    RIPPLE_BUILD_NUMBER = "{build_number}"
    RIPPLE_BUILD_STATUS = "{build_status}"
    RIPPLE_PIPELINE_SYSTEM = "{pipeline_system}"
}}
```
"#,
                job_name = vars.job_name,
                build_number = vars.build_number,
                build_status = vars.build_status,
                pipeline_system = vars.pipeline_system,
            );
        }
        OutputFormat::Yaml => {
            let _ = write!(
                out,
                r#"```yaml
build_info:
  job_name: "{job_name}"
  build_number: "{build_number}"
  build_status: "{build_status}"
  pipeline_system: "{pipeline_system}"
  log_file: "./logs/build.log"
  log_lines: 1000
  timeout: 60
```
"#,
                job_name = vars.job_name,
                build_number = vars.build_number,
                build_status = vars.build_status,
                pipeline_system = vars.pipeline_system,
            );
        }
    }

    out.push_str(
        "\n## Required Parameters\n\
         - `--agent-uuid` and `--agent-password`: agent authentication\n\
         - `--server`: graph server URL\n\
         - `--log-file`: path to the build log\n\n\
         ## Optional Parameters\n\
         - `--job-name`, `--build-number`, `--build-status`: pipeline metadata\n\
         - `--log-lines`: log lines to send (default 1000)\n\
         - `--timeout`: network timeout in seconds (default 60)\n",
    );
    out
}

/// Generate a complete pipeline skeleton for one CI platform.
#[must_use]
pub fn pipeline_guide(platform: CiPlatform, agent: AgentType) -> String {
    let mut out = format!(
        "# Ripple Pipeline Configuration\n\n\
         ## Overview\n\
         - **CI Platform**: {}\n\
         - **Agent Type**: {}\n\
         - **Scan Triggers**: main, develop, feature/*\n\n",
        platform.name(),
        agent.name(),
    );

    out.push_str(&match platform {
        CiPlatform::Jenkins => jenkins_pipeline(agent),
        CiPlatform::GitHubActions => github_actions_pipeline(agent),
        CiPlatform::AzureDevOps => azure_devops_pipeline(agent),
        CiPlatform::GitLab => gitlab_pipeline(agent),
    });

    out.push_str(
        "\n## Operational Notes\n\
         - Store `RIPPLE_HOST`, `AGENT_UUID`, and `AGENT_PASSWORD` as pipeline secrets.\n\
         - Replace `YOUR_SCAN_SPACE_NAME` with your scan space naming strategy.\n\
         - Treat scan failures as unstable rather than failing the build; \
           build-info failures should only log a warning.\n",
    );
    out
}

fn scan_step(agent: AgentType) -> String {
    format!(
        r#"docker run --pull always --rm \
  --env RIPPLE_HOST="$RIPPLE_HOST" \
  --env AGENT_UUID="$AGENT_UUID" \
  --env AGENT_PASSWORD="$AGENT_PASSWORD" \
  --volume "$PWD:/scan" \
  ripple_{}:latest analyze --path=/scan --scan-space="YOUR_SCAN_SPACE_NAME""#,
        agent.name()
    )
}

fn jenkins_pipeline(agent: AgentType) -> String {
    format!(
        r#"## Jenkins Pipeline

```groovy
pipeline {{
    agent any
    environment {{
        RIPPLE_HOST = credentials('ripple-host')
        AGENT_UUID = credentials('ripple-agent-uuid')
        AGENT_PASSWORD = credentials('ripple-agent-password')
    }}
    stages {{
        stage('Scan') {{
            steps {{
                sh '''{scan}'''
            }}
        }}
    }}
}}
```
"#,
        scan = scan_step(agent)
    )
}

fn github_actions_pipeline(agent: AgentType) -> String {
    format!(
        r#"## GitHub Actions Workflow

```yaml
name: ripple-scan
on:
  push:
    branches: [main, develop, 'feature/**']
jobs:
  scan:
    runs-on: ubuntu-latest
    env:
      RIPPLE_HOST: ${{{{ secrets.RIPPLE_HOST }}}}
      AGENT_UUID: ${{{{ secrets.AGENT_UUID }}}}
      AGENT_PASSWORD: ${{{{ secrets.AGENT_PASSWORD }}}}
    steps:
      - uses: actions/checkout@v4
      - name: Run scan
        run: |
          {scan}
```
"#,
        scan = scan_step(agent).replace('\n', "\n          ")
    )
}

fn azure_devops_pipeline(agent: AgentType) -> String {
    format!(
        r#"## Azure DevOps Pipeline

```yaml
trigger:
  branches:
    include: [main, develop, feature/*]
steps:
  - script: |
      {scan}
    displayName: Run scan
    env:
      RIPPLE_HOST: $(RIPPLE_HOST)
      AGENT_UUID: $(AGENT_UUID)
      AGENT_PASSWORD: $(AGENT_PASSWORD)
```
"#,
        scan = scan_step(agent).replace('\n', "\n      ")
    )
}

fn gitlab_pipeline(agent: AgentType) -> String {
    format!(
        r#"## GitLab CI Pipeline

```yaml
ripple-scan:
  rules:
    - if: $CI_COMMIT_BRANCH == "main" || $CI_COMMIT_BRANCH == "develop"
    - if: $CI_COMMIT_BRANCH =~ /^feature\//
  script:
    - {scan}
```
"#,
        scan = scan_step(agent).replace(" \\\n  ", " ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_agent_guide_embeds_arguments() {
        let guide = docker_agent_guide(
            AgentType::Java,
            "services/api",
            "billing-api",
            Some(CiPlatform::GitHubActions),
        );
        assert!(guide.contains("ripple_java:latest analyze"));
        assert!(guide.contains("--path=\"/scan/services/api\""));
        assert!(guide.contains("--application=\"billing-api\""));
        assert!(guide.contains(".github/workflows"));
        assert!(guide.contains("GitHub Actions"));
    }

    #[test]
    fn test_docker_agent_guide_generic_platform() {
        let guide = docker_agent_guide(AgentType::Sql, "db", "warehouse", None);
        assert!(guide.contains("ripple_sql:latest"));
        assert!(guide.contains("your pipeline definition file"));
    }

    #[test]
    fn test_build_info_docker_format_uses_platform_vars() {
        let guide = build_info_guide(Some(CiPlatform::GitLab), OutputFormat::Docker);
        assert!(guide.contains("send_build_info"));
        assert!(guide.contains("--job-name=\"${CI_PROJECT_NAME}\""));
        assert!(guide.contains("--pipeline-system=\"GitLab CI/CD\""));
    }

    #[test]
    fn test_build_info_yaml_format() {
        let guide = build_info_guide(Some(CiPlatform::Jenkins), OutputFormat::Yaml);
        assert!(guide.contains("```yaml"));
        assert!(guide.contains("job_name: \"${JOB_NAME}\""));
        assert!(guide.contains("pipeline_system: \"Jenkins\""));
    }

    #[test]
    fn test_pipeline_guide_per_platform_fences() {
        let jenkins = pipeline_guide(CiPlatform::Jenkins, AgentType::DotNet);
        assert!(jenkins.contains("```groovy"));
        assert!(jenkins.contains("ripple_dotnet:latest"));

        let gitlab = pipeline_guide(CiPlatform::GitLab, AgentType::JavaScript);
        assert!(gitlab.contains("```yaml"));
        assert!(gitlab.contains("ripple_javascript:latest"));
    }
}
