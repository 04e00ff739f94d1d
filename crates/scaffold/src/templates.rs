//! Generated file content for documentation and ignore rules

use chrono::Utc;
use pyforge_types::{InstalledPackage, PROJECT_SUBDIRS};

/// README.md content for a freshly created project.
pub fn readme(name: &str, installed: &[InstalledPackage]) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let mut tree = String::new();
    for dir in PROJECT_SUBDIRS {
        tree.push_str(&format!("├── {dir}/\n"));
    }

    let dependencies = if installed.is_empty() {
        "This project has no third-party dependencies yet.".to_string()
    } else {
        let mut list = String::from("Installed into `venv/` and pinned in `requirements.txt`:\n\n");
        for package in installed {
            list.push_str(&format!("- `{}`\n", package.manifest_line()));
        }
        list
    };

    format!(
        "# {name}\n\
         \n\
         Created with pyforge on {date}.\n\
         \n\
         ## Project structure\n\
         \n\
         ```\n\
         {name}/\n\
         {tree}├── venv/\n\
         ├── requirements.txt\n\
         └── README.md\n\
         ```\n\
         \n\
         ## Dependencies\n\
         \n\
         {dependencies}\n\
         \n\
         ## Getting started\n\
         \n\
         1. Activate the virtual environment:\n\
            - macOS/Linux: `source venv/bin/activate`\n\
            - Windows: `venv\\Scripts\\activate`\n\
         2. Install dependencies (if recreating the environment):\n\
            `pip install -r requirements.txt`\n\
         3. Run the tests: `pytest tests/`\n"
    )
}

/// .gitignore content written alongside `git init`.
pub fn gitignore() -> &'static str {
    "\
# Python
venv/
__pycache__/
*.py[cod]
*.egg-info/
build/
dist/
.eggs/

# IDE
.vscode/
.idea/
*.swp

# OS
.DS_Store
Thumbs.db

# Project
logs/
.env
"
}
