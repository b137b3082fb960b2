//! Defined, enumeration and select types.

use ifcx_step::{Decl, SchemaBuilder};

pub(crate) fn declare(b: &mut SchemaBuilder) {
    // Simple values.
    b.defined("IfcLabel", Decl::String)
        .defined("IfcText", Decl::String)
        .defined("IfcIdentifier", Decl::String)
        .defined("IfcGloballyUniqueId", Decl::String)
        .defined("IfcBoolean", Decl::Boolean)
        .defined("IfcLogical", Decl::Logical)
        .defined("IfcInteger", Decl::Integer)
        .defined("IfcReal", Decl::Real)
        .defined("IfcBinary", Decl::Binary)
        .defined("IfcTimeStamp", Decl::Integer)
        .defined("IfcDimensionCount", Decl::Integer);

    // Measures.
    b.defined("IfcLengthMeasure", Decl::Real)
        .defined("IfcPositiveLengthMeasure", Decl::named("IfcLengthMeasure"))
        .defined("IfcAreaMeasure", Decl::Real)
        .defined("IfcVolumeMeasure", Decl::Real)
        .defined("IfcCountMeasure", Decl::Real)
        .defined("IfcPlaneAngleMeasure", Decl::Real)
        .defined("IfcNormalisedRatioMeasure", Decl::Real)
        .defined("IfcComplexNumber", Decl::list(Decl::Real))
        .defined("IfcCompoundPlaneAngleMeasure", Decl::list(Decl::Integer));

    b.enumeration(
        "IfcSIUnitName",
        &[
            "AMPERE", "BECQUEREL", "CANDELA", "COULOMB", "CUBIC_METRE", "DEGREE_CELSIUS", "FARAD",
            "GRAM", "GRAY", "HENRY", "HERTZ", "JOULE", "KELVIN", "LUMEN", "LUX", "METRE", "MOLE",
            "NEWTON", "OHM", "PASCAL", "RADIAN", "SECOND", "SIEMENS", "SIEVERT", "SQUARE_METRE",
            "STERADIAN", "TESLA", "VOLT", "WATT", "WEBER",
        ],
    );
    b.enumeration(
        "IfcSIPrefix",
        &[
            "EXA", "PETA", "TERA", "GIGA", "MEGA", "KILO", "HECTO", "DECA", "DECI", "CENTI",
            "MILLI", "MICRO", "NANO", "PICO", "FEMTO", "ATTO",
        ],
    );
    b.enumeration(
        "IfcUnitEnum",
        &[
            "ABSORBEDDOSEUNIT", "AMOUNTOFSUBSTANCEUNIT", "AREAUNIT", "DOSEEQUIVALENTUNIT",
            "ELECTRICCAPACITANCEUNIT", "ELECTRICCHARGEUNIT", "ELECTRICCONDUCTANCEUNIT",
            "ELECTRICCURRENTUNIT", "ELECTRICRESISTANCEUNIT", "ELECTRICVOLTAGEUNIT", "ENERGYUNIT",
            "FORCEUNIT", "FREQUENCYUNIT", "ILLUMINANCEUNIT", "INDUCTANCEUNIT", "LENGTHUNIT",
            "LUMINOUSFLUXUNIT", "LUMINOUSINTENSITYUNIT", "MAGNETICFLUXDENSITYUNIT",
            "MAGNETICFLUXUNIT", "MASSUNIT", "PLANEANGLEUNIT", "POWERUNIT", "PRESSUREUNIT",
            "RADIOACTIVITYUNIT", "SOLIDANGLEUNIT", "THERMODYNAMICTEMPERATUREUNIT", "TIMEUNIT",
            "VOLUMEUNIT", "USERDEFINED",
        ],
    );
    b.enumeration(
        "IfcChangeActionEnum",
        &["NOCHANGE", "MODIFIED", "ADDED", "DELETED", "NOTDEFINED"],
    );
    b.enumeration(
        "IfcStateEnum",
        &["READWRITE", "READONLY", "LOCKED", "READWRITELOCKED", "READONLYLOCKED"],
    );
    b.enumeration(
        "IfcRoleEnum",
        &[
            "SUPPLIER", "MANUFACTURER", "CONTRACTOR", "SUBCONTRACTOR", "ARCHITECT",
            "STRUCTURALENGINEER", "COSTENGINEER", "CLIENT", "BUILDINGOWNER", "BUILDINGOPERATOR",
            "MECHANICALENGINEER", "ELECTRICALENGINEER", "PROJECTMANAGER", "FACILITIESMANAGER",
            "CIVILENGINEER", "COMMISSIONINGENGINEER", "ENGINEER", "OWNER", "CONSULTANT",
            "CONSTRUCTIONMANAGER", "FIELDCONSTRUCTIONMANAGER", "RESELLER", "USERDEFINED",
        ],
    );
    b.enumeration(
        "IfcAddressTypeEnum",
        &["OFFICE", "SITE", "HOME", "DISTRIBUTIONPOINT", "USERDEFINED"],
    );
    b.enumeration("IfcElementCompositionEnum", &["COMPLEX", "ELEMENT", "PARTIAL"]);
    b.enumeration(
        "IfcWallTypeEnum",
        &[
            "MOVABLE", "PARAPET", "PARTITIONING", "PLUMBINGWALL", "SHEAR", "SOLIDWALL",
            "STANDARD", "POLYGONAL", "ELEMENTEDWALL", "USERDEFINED", "NOTDEFINED",
        ],
    );
    b.enumeration("IfcProfileTypeEnum", &["CURVE", "AREA"]);

    b.select(
        "IfcSimpleValue",
        &[
            "IfcLabel", "IfcText", "IfcIdentifier", "IfcBoolean", "IfcLogical", "IfcInteger",
            "IfcReal", "IfcBinary", "IfcTimeStamp",
        ],
    );
    b.select(
        "IfcMeasureValue",
        &[
            "IfcLengthMeasure", "IfcPositiveLengthMeasure", "IfcAreaMeasure", "IfcVolumeMeasure",
            "IfcCountMeasure", "IfcPlaneAngleMeasure", "IfcNormalisedRatioMeasure",
            "IfcComplexNumber", "IfcCompoundPlaneAngleMeasure",
        ],
    );
    b.select("IfcValue", &["IfcMeasureValue", "IfcSimpleValue"]);
    b.select("IfcUnit", &["IfcNamedUnit"]);
    b.select("IfcAxis2Placement", &["IfcAxis2Placement2D", "IfcAxis2Placement3D"]);
    b.select("IfcMaterialSelect", &["IfcMaterialDefinition", "IfcMaterialList"]);
    b.select("IfcDefinitionSelect", &["IfcObjectDefinition", "IfcPropertyDefinition"]);
    b.select("IfcPropertySetDefinitionSelect", &["IfcPropertySetDefinition"]);
}
