//! Bundler configuration.
//!
//! [`BundleOptions`] is serialised to JSON and handed to the external
//! bundler. Field names follow webpack's configuration schema; what JSON
//! cannot express (regular expressions, plugin instances) is spelled as
//! strings and package names that the shipped config adapter turns into
//! the real thing.
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::entries::EntryMap;
use crate::config::Mode;
use crate::config::babelrc::TranspilerConfig;
use crate::config::browserslist::TargetList;

/// Source map style emitted in every mode.
pub const DEVTOOL: &str = "source-map";

/// Sub-directory of the output directory receiving bundles.
pub const RES_OUT_DIR: &str = "res";

/// Extensions the bundler may omit in import specifiers.
pub const RESOLVE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".mjs", ".mjsx", ".ts", ".tsx", ".json", ".css", ".less", ".scss", ".sass",
];

const SCRIPT_TEST: &str = r"\.(js|jsx|mjs|mjsx|ts|tsx)$";
const STYLE_TEST: &str = r"\.(sass|scss|css)$";
const VENDOR_EXCLUDE: &str = "(node_modules)";

/// Complete configuration for one bundler run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    /// Bundle name to entry file.
    pub entry: EntryMap,
    /// Where bundles are written.
    pub output: Output,
    /// Build flavour, forwarded as webpack's `mode`.
    pub mode: Mode,
    /// Source map style, always [`DEVTOOL`].
    pub devtool: &'static str,
    /// Module resolution settings.
    pub resolve: Resolve,
    /// Per-file-type loader chains.
    pub module: ModuleRules,
    /// Plugins applied to the whole compilation.
    pub plugins: Vec<Plugin>,
    /// Minification settings.
    pub optimization: Optimization,
}

/// Bundle file naming and location.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    /// File name pattern, `[name]` being the entry name.
    pub filename: &'static str,
    /// Absolute output directory, `<out_dir>/res`.
    pub path: PathBuf,
}

/// Module resolution settings.
#[derive(Debug, Clone, Serialize)]
pub struct Resolve {
    /// Extensions tried, in order, for extension-less imports.
    pub extensions: &'static [&'static str],
}

/// The `module` section of the options.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRules {
    /// Script rule first, style rule second.
    pub rules: Vec<Rule>,
}

/// A file-type rule: files matching `test` go through `loaders`, applied
/// last to first.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    /// Regular expression source matched against the module path.
    pub test: &'static str,
    /// Regular expression source for paths left alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<&'static str>,
    /// Loader chain.
    #[serde(rename = "use")]
    pub loaders: Vec<Loader>,
}

/// One step of a loader chain.
#[derive(Debug, Clone, Serialize)]
pub struct Loader {
    /// Package name of the loader.
    pub loader: &'static str,
    /// Options handed to the loader, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<LoaderOptions>,
}

/// Options of the loaders this crate configures.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LoaderOptions {
    /// `.babelrc` contents with targets injected.
    Transpiler(TranspilerConfig),
    /// Source map switch shared by the CSS and SASS loaders.
    SourceMap(SourceMapOptions),
    /// PostCSS settings.
    PostCss(PostCssOptions),
}

/// Options of a loader that only needs its source map switch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapOptions {
    /// Emit source maps.
    pub source_map: bool,
}

/// PostCSS loader options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCssOptions {
    /// Emit source maps.
    pub source_map: bool,
    /// Treat stylesheets as CSS modules.
    pub modules: bool,
    /// PostCSS plugins, instantiated by the config adapter.
    pub plugins: Vec<PostCssPlugin>,
}

/// The environment preset for stylesheets, fed the same targets as scripts.
#[derive(Debug, Clone, Serialize)]
pub struct PostCssPlugin {
    /// Package name of the plugin factory.
    pub plugin: &'static str,
    /// Feature stage; 0 enables every proposal.
    pub stage: u8,
    /// Target environments.
    pub browsers: TargetList,
}

/// A compilation-wide plugin, named by its package.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "plugin")]
pub enum Plugin {
    /// Extracts compiled styles into standalone `.css` files.
    #[serde(rename = "mini-css-extract-plugin")]
    CssExtract(CssExtractOptions),
}

/// Naming of extracted stylesheets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssExtractOptions {
    /// Pattern for entry stylesheets.
    pub filename: &'static str,
    /// Pattern for split-off chunks.
    pub chunk_filename: &'static str,
}

/// The `optimization` section of the options.
#[derive(Debug, Clone, Serialize)]
pub struct Optimization {
    /// Minification steps; empty in development.
    pub minimizer: Vec<Minimizer>,
}

/// A minification step applied to the emitted assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plugin")]
pub enum Minimizer {
    /// Script minifier.
    #[serde(rename = "uglifyjs-webpack-plugin")]
    Script(ScriptMinifier),
    /// Stylesheet optimizer.
    #[serde(rename = "optimize-css-assets-webpack-plugin")]
    Style(StyleOptimizer),
}

/// Script minifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMinifier {
    /// Reuse results between runs.
    pub cache: bool,
    /// Minify on several workers.
    pub parallel: bool,
    /// Keep source maps in step with the minified output.
    pub source_map: bool,
    /// Settings passed through to the minifier itself.
    pub uglify_options: UglifyOptions,
}

/// Settings passed through to the script minifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UglifyOptions {
    /// Output formatting.
    pub output: UglifyOutput,
}

/// Output formatting of the script minifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UglifyOutput {
    /// Keep comments.
    pub comments: bool,
}

/// Stylesheet optimizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOptimizer {
    /// Settings passed through to the CSS processor.
    pub css_processor_options: CssProcessorOptions,
}

/// Settings passed through to the CSS processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssProcessorOptions {
    /// Source map handling.
    pub map: CssMapOptions,
    /// Comment removal.
    pub discard_comments: DiscardComments,
}

/// Source map handling of the CSS processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssMapOptions {
    /// Embed the map in the stylesheet instead of a separate file.
    pub inline: bool,
}

/// Comment removal of the CSS processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardComments {
    /// Drop `/*! ... */` comments too.
    pub remove_all: bool,
}

impl BundleOptions {
    /// Assemble the options for one build.
    ///
    /// Bundles land in `<out_dir>/res`. Source maps are always emitted;
    /// minimizers are only present in production.
    #[must_use]
    pub fn build(
        targets: &TargetList,
        transpiler: TranspilerConfig,
        entry: EntryMap,
        mode: Mode,
        out_dir: &Path,
    ) -> Self {
        Self {
            entry,
            output: Output {
                filename: "[name].js",
                path: out_dir.join(RES_OUT_DIR),
            },
            mode,
            devtool: DEVTOOL,
            resolve: Resolve {
                extensions: RESOLVE_EXTENSIONS,
            },
            module: ModuleRules {
                rules: vec![script_rule(transpiler), style_rule(targets)],
            },
            plugins: vec![Plugin::CssExtract(CssExtractOptions {
                filename: "[name].css",
                chunk_filename: "[id].css",
            })],
            optimization: Optimization {
                minimizer: minimizers(mode),
            },
        }
    }

    /// Minification steps in application order.
    #[must_use]
    pub fn minimizers(&self) -> &[Minimizer] {
        &self.optimization.minimizer
    }

    /// Pretty-printed JSON as written to the bundler's options file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn script_rule(transpiler: TranspilerConfig) -> Rule {
    Rule {
        test: SCRIPT_TEST,
        exclude: Some(VENDOR_EXCLUDE),
        loaders: vec![Loader {
            loader: "babel-loader",
            options: Some(LoaderOptions::Transpiler(transpiler)),
        }],
    }
}

fn style_rule(targets: &TargetList) -> Rule {
    Rule {
        test: STYLE_TEST,
        exclude: None,
        loaders: vec![
            Loader {
                loader: "mini-css-extract-plugin/loader",
                options: None,
            },
            Loader {
                loader: "css-loader",
                options: Some(LoaderOptions::SourceMap(SourceMapOptions { source_map: true })),
            },
            Loader {
                loader: "postcss-loader",
                options: Some(LoaderOptions::PostCss(PostCssOptions {
                    source_map: true,
                    modules: true,
                    plugins: vec![PostCssPlugin {
                        plugin: "postcss-preset-env",
                        stage: 0,
                        browsers: targets.clone(),
                    }],
                })),
            },
            Loader {
                loader: "sass-loader",
                options: Some(LoaderOptions::SourceMap(SourceMapOptions { source_map: true })),
            },
        ],
    }
}

fn minimizers(mode: Mode) -> Vec<Minimizer> {
    let mut steps = Vec::new();
    if mode.is_production() {
        steps.push(Minimizer::Script(ScriptMinifier {
            cache: true,
            parallel: true,
            source_map: true,
            uglify_options: UglifyOptions {
                output: UglifyOutput { comments: false },
            },
        }));
        steps.push(Minimizer::Style(StyleOptimizer {
            css_processor_options: CssProcessorOptions {
                map: CssMapOptions { inline: false },
                discard_comments: DiscardComments { remove_all: true },
            },
        }));
    }
    steps
}
