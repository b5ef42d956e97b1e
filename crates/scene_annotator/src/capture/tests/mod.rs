//! Capture driver tests against stub scenes and renderers
