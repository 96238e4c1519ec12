use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::templates::{PLAYWRIGHT_TEMPLATE, SELENIUM_TEMPLATE, TESTCAFE_TEMPLATE};
use crate::error::ForgeError;

/// Test framework a generated script targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Playwright,
    Selenium,
    TestCafe,
}

/// Everything that differs between frameworks.
///
/// Adding a framework means adding a variant and a row in `FRAMEWORKS`.
#[derive(Debug)]
pub struct FrameworkSpec {
    /// Framework this row describes
    pub framework: Framework,

    /// Lowercase identifier used on the command line
    pub id: &'static str,

    /// Human-readable name
    pub display_name: &'static str,

    /// Instruction template sent ahead of the project context
    pub template: &'static str,

    /// Subdirectory of the output directory; also the working directory of the run
    pub subdir: &'static str,

    /// Fixed file name of the generated script
    pub output_file: &'static str,

    /// Shell command running the script; `{file}` is replaced by the file's basename
    pub run_command: &'static str,
}

/// Static lookup table, indexed by `Framework as usize`
static FRAMEWORKS: [FrameworkSpec; 3] = [
    FrameworkSpec {
        framework: Framework::Playwright,
        id: "playwright",
        display_name: "Playwright",
        template: PLAYWRIGHT_TEMPLATE,
        subdir: "playwright",
        output_file: "generated.spec.ts",
        run_command: "npx playwright test {file} --reporter=line",
    },
    FrameworkSpec {
        framework: Framework::Selenium,
        id: "selenium",
        display_name: "Selenium WebDriver",
        template: SELENIUM_TEMPLATE,
        subdir: "selenium",
        output_file: "generated.test.js",
        run_command: "npx mocha {file} --timeout 60000",
    },
    FrameworkSpec {
        framework: Framework::TestCafe,
        id: "testcafe",
        display_name: "TestCafe",
        template: TESTCAFE_TEMPLATE,
        subdir: "testcafe",
        output_file: "generated.test.js",
        run_command: "npx testcafe chrome:headless {file}",
    },
];

impl Framework {
    /// All supported frameworks, in the order the driver runs them
    pub const ALL: [Framework; 3] = [Framework::Playwright, Framework::Selenium, Framework::TestCafe];

    /// Look up the static row for this framework
    pub fn spec(self) -> &'static FrameworkSpec {
        &FRAMEWORKS[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    /// Working directory for the run command, under the given script directory
    pub fn working_dir(self, script_dir: &Path) -> PathBuf {
        script_dir.join(self.spec().subdir)
    }

    /// Fixed path of the generated script, under the given script directory
    pub fn output_path(self, script_dir: &Path) -> PathBuf {
        self.working_dir(script_dir).join(self.spec().output_file)
    }

    /// Run command with `{file}` resolved to the given basename
    pub fn run_command(self, file_name: &str) -> String {
        self.spec().run_command.replace("{file}", file_name)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Framework {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Framework::ALL
            .into_iter()
            .find(|fw| fw.id() == wanted)
            .ok_or_else(|| ForgeError::UnknownFramework(s.to_string()))
    }
}
